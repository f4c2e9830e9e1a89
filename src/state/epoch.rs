/// Generation counter guarding a page against late responses. Each fetch
/// advances the epoch and carries the returned [`Tag`]; a response is only
/// applied while its tag is still current.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(u64);

impl Epoch {
    pub fn advance(&mut self) -> Tag {
        self.0 = self.0.wrapping_add(1);
        Tag(self.0)
    }

    pub fn current(&self) -> Tag {
        Tag(self.0)
    }

    pub fn is_current(&self, tag: Tag) -> bool {
        self.0 == tag.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_tag_is_current() {
        let mut epoch = Epoch::default();
        let first = epoch.advance();
        assert!(epoch.is_current(first));

        let second = epoch.advance();
        assert!(!epoch.is_current(first));
        assert!(epoch.is_current(second));
        assert_eq!(epoch.current(), second);
    }

    #[test]
    fn separate_epochs_do_not_interfere() {
        let mut teams = Epoch::default();
        let mut events = Epoch::default();
        teams.advance();
        teams.advance();
        let tag = events.advance();
        assert!(events.is_current(tag));
        assert!(!teams.is_current(tag));
    }
}
