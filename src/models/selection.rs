use crate::models::taxonomy::TaxonomyItem;

/// The six required levels of the selection cascade, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Exam,
    Course,
    Subject,
    Unit,
    Chapter,
    Topic,
}

/// Explicit state for the cascading selector: one current selection per
/// level, with the rule that changing a level clears every descendant
/// level. Part and slot are qualifiers keyed to the course and reset
/// whenever the course (or anything above it) changes.
///
/// Pure in-memory state; callers load the option lists for each level
/// from the taxonomy endpoints.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    exam: Option<TaxonomyItem>,
    course: Option<TaxonomyItem>,
    subject: Option<TaxonomyItem>,
    unit: Option<TaxonomyItem>,
    chapter: Option<TaxonomyItem>,
    topic: Option<TaxonomyItem>,
    part: Option<TaxonomyItem>,
    slot: Option<TaxonomyItem>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, level: Level, item: Option<TaxonomyItem>) {
        match level {
            Level::Exam => self.exam = item,
            Level::Course => self.course = item,
            Level::Subject => self.subject = item,
            Level::Unit => self.unit = item,
            Level::Chapter => self.chapter = item,
            Level::Topic => self.topic = item,
        }
        if level < Level::Course {
            self.course = None;
        }
        if level < Level::Subject {
            self.subject = None;
        }
        if level < Level::Unit {
            self.unit = None;
        }
        if level < Level::Chapter {
            self.chapter = None;
        }
        if level < Level::Topic {
            self.topic = None;
        }
        if level <= Level::Course {
            self.part = None;
            self.slot = None;
        }
    }

    pub fn select_part(&mut self, item: Option<TaxonomyItem>) {
        if self.course.is_some() {
            self.part = item;
        }
    }

    pub fn select_slot(&mut self, item: Option<TaxonomyItem>) {
        if self.course.is_some() {
            self.slot = item;
        }
    }

    pub fn get(&self, level: Level) -> Option<&TaxonomyItem> {
        match level {
            Level::Exam => self.exam.as_ref(),
            Level::Course => self.course.as_ref(),
            Level::Subject => self.subject.as_ref(),
            Level::Unit => self.unit.as_ref(),
            Level::Chapter => self.chapter.as_ref(),
            Level::Topic => self.topic.as_ref(),
        }
    }

    pub fn part(&self) -> Option<&TaxonomyItem> {
        self.part.as_ref()
    }

    pub fn slot(&self) -> Option<&TaxonomyItem> {
        self.slot.as_ref()
    }

    /// True once every required level has a selection.
    pub fn is_complete(&self) -> bool {
        self.exam.is_some()
            && self.course.is_some()
            && self.subject.is_some()
            && self.unit.is_some()
            && self.chapter.is_some()
            && self.topic.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(name: &str) -> TaxonomyItem {
        TaxonomyItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn full_selection() -> SelectionState {
        let mut s = SelectionState::new();
        s.select(Level::Exam, Some(item("GATE")));
        s.select(Level::Course, Some(item("CS")));
        s.select(Level::Subject, Some(item("Algorithms")));
        s.select(Level::Unit, Some(item("Graphs")));
        s.select(Level::Chapter, Some(item("Shortest Paths")));
        s.select(Level::Topic, Some(item("Dijkstra")));
        s
    }

    #[test]
    fn complete_after_all_six_levels() {
        let mut s = SelectionState::new();
        assert!(!s.is_complete());
        s.select(Level::Exam, Some(item("GATE")));
        s.select(Level::Course, Some(item("CS")));
        assert!(!s.is_complete());
        let s = full_selection();
        assert!(s.is_complete());
    }

    #[test]
    fn changing_a_level_clears_descendants() {
        let mut s = full_selection();
        s.select(Level::Unit, Some(item("Trees")));
        assert!(s.get(Level::Exam).is_some());
        assert!(s.get(Level::Subject).is_some());
        assert_eq!(s.get(Level::Unit).unwrap().name, "Trees");
        assert!(s.get(Level::Chapter).is_none());
        assert!(s.get(Level::Topic).is_none());
        assert!(!s.is_complete());
    }

    #[test]
    fn changing_exam_resets_everything() {
        let mut s = full_selection();
        s.select_part(Some(item("Part A")));
        s.select_slot(Some(item("Slot 1")));
        s.select(Level::Exam, Some(item("JEE")));
        assert!(s.get(Level::Course).is_none());
        assert!(s.get(Level::Topic).is_none());
        assert!(s.part().is_none());
        assert!(s.slot().is_none());
    }

    #[test]
    fn part_and_slot_follow_the_course() {
        let mut s = SelectionState::new();
        // No course yet: qualifiers cannot be set.
        s.select_part(Some(item("Part A")));
        assert!(s.part().is_none());

        s.select(Level::Exam, Some(item("GATE")));
        s.select(Level::Course, Some(item("CS")));
        s.select_part(Some(item("Part A")));
        s.select_slot(Some(item("Slot 1")));
        assert!(s.part().is_some());

        s.select(Level::Course, Some(item("EE")));
        assert!(s.part().is_none());
        assert!(s.slot().is_none());
    }

    #[test]
    fn qualifiers_survive_topic_changes() {
        let mut s = full_selection();
        s.select_part(Some(item("Part A")));
        s.select(Level::Topic, Some(item("Bellman-Ford")));
        assert!(s.part().is_some());
    }
}
