pub mod delete_tags;
pub mod select_tags;

#[cfg(test)]
pub(crate) mod test_registry;
