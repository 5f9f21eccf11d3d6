//! Flat leveled headings to a nested section forest.
//!
//! One left-to-right pass with an explicit stack of open sections. A
//! heading closes every open section at the same or a deeper level; a
//! closed section is moved into its parent's child list (or the root list),
//! so the stack owns open nodes and finished nodes are owned by their parent.

use crate::config::HierarchyConfig;
use folio_types::{LeveledHeading, PageRange, Section};

/// How the end page of a section is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStrategy {
    /// End just before the next heading of any level.
    NextHeading,
    /// End just before the next heading at the same or a shallower level,
    /// skipping over the section's own descendants.
    NextSiblingOrShallower,
}

#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    strategy: RangeStrategy,
    id_prefix: &'static str,
    last_section_span: u32,
    last_page: Option<u32>,
}

struct OpenSection {
    heading_level: u8,
    section: Section,
    child_count: usize,
}

impl HierarchyBuilder {
    pub fn new(strategy: RangeStrategy, id_prefix: &'static str, config: &HierarchyConfig) -> Self {
        Self {
            strategy,
            id_prefix,
            last_section_span: config.last_section_span,
            last_page: None,
        }
    }

    /// Clamp estimated ends to the document's last page.
    pub fn with_last_page(mut self, last_page: Option<u32>) -> Self {
        self.last_page = last_page.filter(|page| *page > 0);
        self
    }

    /// Builds the forest. Headings are stable-sorted by page first, so
    /// entries on the same page keep their original order.
    pub fn build(&self, headings: &[LeveledHeading]) -> Vec<Section> {
        let mut ordered: Vec<&LeveledHeading> = headings.iter().collect();
        ordered.sort_by_key(|heading| heading.page);

        let ends = self.range_ends(&ordered);
        let mut roots: Vec<Section> = Vec::new();
        let mut stack: Vec<OpenSection> = Vec::new();

        for (heading, end) in ordered.iter().zip(ends) {
            while stack
                .last()
                .is_some_and(|open| open.heading_level >= heading.level)
            {
                close_top(&mut stack, &mut roots);
            }

            let (id, parent_id) = match stack.last_mut() {
                Some(parent) => {
                    parent.child_count += 1;
                    (
                        format!("{}.{}", parent.section.id, parent.child_count),
                        Some(parent.section.id.clone()),
                    )
                }
                None => (format!("{}-{}", self.id_prefix, roots.len() + 1), None),
            };

            let depth = u8::try_from(stack.len() + 1).unwrap_or(u8::MAX);
            let mut section = Section::new(id, &heading.title, depth, PageRange::new(heading.page, end));
            section.parent_id = parent_id;

            stack.push(OpenSection {
                heading_level: heading.level,
                section,
                child_count: 0,
            });
        }

        while !stack.is_empty() {
            close_top(&mut stack, &mut roots);
        }

        for root in &mut roots {
            enclose_children(root);
        }
        roots
    }

    fn range_ends(&self, ordered: &[&LeveledHeading]) -> Vec<u32> {
        (0..ordered.len())
            .map(|idx| {
                let heading = ordered[idx];
                let following = match self.strategy {
                    RangeStrategy::NextHeading => ordered.get(idx + 1),
                    RangeStrategy::NextSiblingOrShallower => ordered[idx + 1..]
                        .iter()
                        .find(|next| next.level <= heading.level),
                };
                match following {
                    Some(next) => next.page.saturating_sub(1).max(heading.page),
                    None => self.placeholder_end(heading.page),
                }
            })
            .collect()
    }

    /// Estimated end of a section nothing follows. Approximate by nature.
    fn placeholder_end(&self, start: u32) -> u32 {
        let estimate = start.saturating_add(self.last_section_span);
        match self.last_page {
            Some(last) => estimate.min(last).max(start),
            None => estimate,
        }
    }
}

fn close_top(stack: &mut Vec<OpenSection>, roots: &mut Vec<Section>) {
    let Some(open) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some(parent) => parent.section.children.push(open.section),
        None => roots.push(open.section),
    }
}

/// Widens each parent's end to cover its children once every sibling is
/// known. Returns the subtree's end page.
fn enclose_children(section: &mut Section) -> u32 {
    let mut end = section.page_range.end;
    for child in &mut section.children {
        end = end.max(enclose_children(child));
    }
    section.page_range.end = end;
    end
}
