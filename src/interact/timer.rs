/// Single-slot deferred action. Scheduling replaces whatever was pending,
/// so at most one reset can ever be outstanding.
#[derive(Clone, Debug, PartialEq)]
pub struct Debounce<K> {
    slot: Option<(f64, K)>,
}

impl<K> Default for Debounce<K> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<K> Debounce<K> {
    pub fn schedule(&mut self, due: f64, key: K) {
        self.slot = Some((due, key));
    }

    pub fn cancel(&mut self) -> Option<K> {
        self.slot.take().map(|(_, key)| key)
    }

    pub fn pending(&self) -> Option<&K> {
        self.slot.as_ref().map(|(_, key)| key)
    }

    pub fn due(&self) -> Option<f64> {
        self.slot.as_ref().map(|(due, _)| *due)
    }

    /// Empties the slot and returns its key once `now` reached the due time.
    pub fn take_due(&mut self, now: f64) -> Option<K> {
        match self.slot {
            Some((due, _)) if now >= due => self.cancel(),
            _ => None,
        }
    }
}
