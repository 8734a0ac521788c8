/// A unit flowing through a model: a customer, a call, a car.
///
/// The kernel only knows when an entity was created. Anything else a model needs, such as a customer class or a
/// branch index, goes in the `tag`, which the kernel never inspects. Entities are owned by whoever holds them (a
/// queue, an event, a handler's local variable) and are dropped when the model lets go of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity<Tag = ()> {
    created_at: f64,
    tag: Tag,
}

impl<Tag> Entity<Tag> {
    /// An entity stamped with creation time `now`.
    pub fn new(tag: Tag, now: f64) -> Self {
        Self { created_at: now, tag }
    }

    /// Clock value when the entity was created, or last re-stamped.
    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    /// Time elapsed since creation as of `now`.
    pub fn age(&self, now: f64) -> f64 {
        now - self.created_at
    }

    /// Move the creation stamp to `now`, e.g. when the entity enters the stage whose duration is being measured.
    pub fn restamp(&mut self, now: f64) {
        self.created_at = now;
    }

    /// The model-owned tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Exclusive access to the model-owned tag.
    pub fn tag_mut(&mut self) -> &mut Tag {
        &mut self.tag
    }

    /// Consume the entity, keeping its tag.
    pub fn into_tag(self) -> Tag {
        self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_counts_from_creation() {
        let entity = Entity::new("finance", 2.5);
        assert_eq!(2.5, entity.created_at());
        assert_eq!(4.0, entity.age(6.5));
        assert_eq!("finance", entity.into_tag());
    }

    #[test]
    fn restamp_restarts_the_age() {
        let mut entity = Entity::new(0u8, 1.0);
        entity.restamp(5.0);
        *entity.tag_mut() += 1;
        assert_eq!(0.0, entity.age(5.0), "restamped entity should be brand new");
        assert_eq!(&1, entity.tag());
    }
}
