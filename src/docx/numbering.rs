/// Numbering support for list labels.
///
/// Numbering defines how lists and outline numbering are formatted. A
/// paragraph references a numbering instance (`w:numId`) and a level
/// (`w:ilvl`); the instance points at an abstract definition holding the
/// per-level format, label template and suffix.
use crate::docx::enums::{LevelSuffix, NumberFormat};
use serde::{Deserialize, Serialize};

/// One level of an abstract numbering definition (`w:lvl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingLevel {
    /// Zero-based level index (`w:ilvl`)
    pub level: u32,
    /// First counter value (`w:start`)
    pub start: u32,
    /// Counter format (`w:numFmt`)
    pub format: NumberFormat,
    /// Label template such as `%1.%2` (`w:lvlText`)
    pub text: String,
    /// What follows the label (`w:suff`)
    pub suffix: LevelSuffix,
}

impl NumberingLevel {
    pub fn new(level: u32, format: NumberFormat, text: impl Into<String>) -> Self {
        Self {
            level,
            start: 1,
            format,
            text: text.into(),
            suffix: LevelSuffix::Tab,
        }
    }

    pub fn with_suffix(mut self, suffix: LevelSuffix) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }
}

/// An abstract numbering definition (template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractNum {
    /// Abstract numbering ID
    pub id: u32,
    /// Levels, in any order
    pub levels: Vec<NumberingLevel>,
}

impl AbstractNum {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            levels: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: NumberingLevel) -> Self {
        self.levels.push(level);
        self
    }

    /// Get a level by its index.
    pub fn level(&self, level: u32) -> Option<&NumberingLevel> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Render the label of `level` for the given counters.
    ///
    /// `counters[k]` is the current value of level `k`; `%N` placeholders in
    /// the template are replaced by level `N-1`'s counter in that level's
    /// format. Bullet levels render their template verbatim.
    pub fn render_label(&self, level: u32, counters: &[u32]) -> String {
        let Some(lvl) = self.level(level) else {
            return String::new();
        };
        if lvl.format == NumberFormat::Bullet {
            return lvl.text.clone();
        }

        let mut out = String::with_capacity(lvl.text.len() + 4);
        let mut chars = lvl.text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%'
                && let Some(d) = chars.peek().and_then(|d| d.to_digit(10))
                && (1..=9).contains(&d)
            {
                chars.next();
                let ref_level = d - 1;
                let (format, start) = self
                    .level(ref_level)
                    .map_or((lvl.format, 1), |l| (l.format, l.start));
                let value = counters.get(ref_level as usize).copied().unwrap_or(start);
                out.push_str(&format.format_value(value));
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// A numbering instance (concrete use of an abstract numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Num {
    /// Numbering ID
    pub id: u32,
    /// Reference to abstract numbering ID
    pub abstract_num_id: u32,
}

/// Numbering definitions in a Word document.
///
/// Contains abstract numbering definitions and numbering instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Numbering {
    abstract_nums: Vec<AbstractNum>,
    nums: Vec<Num>,
}

impl Numbering {
    /// Create a new empty Numbering.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_abstract_num(&mut self, abstract_num: AbstractNum) {
        self.abstract_nums.retain(|a| a.id != abstract_num.id);
        self.abstract_nums.push(abstract_num);
    }

    pub fn add_num(&mut self, num: Num) {
        self.nums.retain(|n| n.id != num.id);
        self.nums.push(num);
    }

    /// Get all abstract numbering definitions.
    #[inline]
    pub fn abstract_nums(&self) -> &[AbstractNum] {
        &self.abstract_nums
    }

    /// Get all numbering instances.
    #[inline]
    pub fn nums(&self) -> &[Num] {
        &self.nums
    }

    /// Get an abstract numbering definition by ID.
    pub fn get_abstract_num(&self, id: u32) -> Option<&AbstractNum> {
        self.abstract_nums.iter().find(|a| a.id == id)
    }

    /// Get a numbering instance by ID.
    pub fn get_num(&self, id: u32) -> Option<&Num> {
        self.nums.iter().find(|n| n.id == id)
    }

    /// Resolve the abstract definition behind a numbering instance.
    ///
    /// `numId` 0 means "no numbering" and always resolves to `None`.
    pub fn abstract_for(&self, num_id: u32) -> Option<&AbstractNum> {
        if num_id == 0 {
            return None;
        }
        let num = self.get_num(num_id)?;
        let abstract_num = self.get_abstract_num(num.abstract_num_id);
        if abstract_num.is_none() {
            log::debug!(
                "numbering instance {} references unknown abstract numbering {}",
                num_id,
                num.abstract_num_id
            );
        }
        abstract_num
    }

    /// Get the level definition used by a paragraph.
    pub fn level(&self, num_id: u32, level: u32) -> Option<&NumberingLevel> {
        self.abstract_for(num_id)?.level(level)
    }
}
