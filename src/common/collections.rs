pub use std::collections::BTreeMap;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
