use ahash::RandomState;
use std::collections::HashSet as StdHashSet;

pub type HashSet<K> = StdHashSet<K, RandomState>;
