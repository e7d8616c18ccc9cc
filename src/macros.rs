// Implements `Key` for types that have no null-equivalent value.
macro_rules! non_null_key {
  ($($t:ty),* $(,)?) => {
    $(
      impl $crate::key::Key for $t {}
    )*
  };
}
