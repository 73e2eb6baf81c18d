use im::Vector;

pub trait PushImmut<T> {
    fn push(&self, item: T) -> Vector<T>;
}
impl<T: Clone> PushImmut<T> for Vector<T> {
    fn push(&self, item: T) -> Vector<T> {
        let mut result = self.clone();
        result.push_back(item);
        result
    }
}

pub trait RemoveImmut<T> {
    /// Returns the remaining items and the removed one, or `None` when `idx` is out of range.
    fn remove_idx(&self, idx: usize) -> Option<(Vector<T>, T)>;
}
impl<T: Clone> RemoveImmut<T> for Vector<T> {
    fn remove_idx(&self, idx: usize) -> Option<(Vector<T>, T)> {
        if idx >= self.len() {
            return None;
        }
        let mut result = self.clone();
        let removed = result.remove(idx);
        Some((result, removed))
    }
}

pub trait LastN<T> {
    /// The last `n` items, oldest first.
    fn last_n(&self, n: usize) -> Vec<T>;
}
impl<T: Clone> LastN<T> for Vector<T> {
    fn last_n(&self, n: usize) -> Vec<T> {
        let skip = self.len().saturating_sub(n);
        self.iter().skip(skip).cloned().collect()
    }
}

/// Trims every name, drops repeats and keeps the first occurrence order.
pub fn dedup_trimmed<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().fold(Vec::new(), |mut acc, name| {
        let name = name.as_ref().trim();
        if !acc.iter().any(|n| n == name) {
            acc.push(name.to_string());
        }
        acc
    })
}
