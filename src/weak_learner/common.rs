pub(crate) mod split_rule;
pub(crate) mod type_and_struct;
