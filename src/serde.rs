mod fields_ref;
