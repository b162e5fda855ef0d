//! Completion percentage derived from "Activities" links

use crate::models::Issue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActivityProgress {
    pub done: usize,
    pub total: usize,
    pub percent: u8,
}

impl ActivityProgress {
    /// Count activity links and compute the truncated percentage.
    ///
    /// An issue without activity links has no progress signal and reports 0.
    pub fn from_issue(issue: &Issue) -> Self {
        let (done, total) = issue
            .activity_links()
            .fold((0usize, 0usize), |(done, total), link| {
                (done + usize::from(link.is_done()), total + 1)
            });

        let percent = if total == 0 {
            0
        } else {
            // done <= total, so this is within 0..=100
            (done * 100 / total) as u8
        };

        Self {
            done,
            total,
            percent,
        }
    }
}

pub fn calculate(issue: &Issue) -> u8 {
    ActivityProgress::from_issue(issue).percent
}
