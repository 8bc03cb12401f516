use crate::url::normalize_url;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};

/// Deduplicated set of image URLs discovered across all pages
///
/// Keys are normalized before insertion; the membership test and the insert
/// happen under one lock.
#[derive(Debug, Default)]
pub struct ImageSet {
    urls: Mutex<HashSet<String>>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the normalized form of `url`
    ///
    /// Returns true if the image was not seen before.
    pub fn insert(&self, url: &str) -> bool {
        let normalized = normalize_url(url);
        self.urls.lock().insert(normalized)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.lock().contains(&normalize_url(url))
    }

    pub fn len(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.lock().is_empty()
    }

    /// Copies the current contents out; order is unspecified
    pub fn snapshot(&self) -> Vec<String> {
        self.urls.lock().iter().cloned().collect()
    }

    /// Copies the current contents out in sorted order
    pub fn sorted(&self) -> BTreeSet<String> {
        self.urls.lock().iter().cloned().collect()
    }
}
