//! The level table and level arithmetic.
//!
//! A level table is an ordered list of [`LevelInfo`] rows. Row 1 starts at
//! 0 XP and every following row needs strictly more XP than the one before,
//! so the level for any XP total is the last row whose requirement it meets.
//!
//! A single large award may cross several rows at once. [`LevelTable::climb`]
//! walks the table from the current level and returns every row crossed,
//! which the XP engine turns into level history records.

use trail_types::LevelInfo;

use crate::error::ProgressError;

/// The shipped ten-level table: `(xp_required, title, color)`.
const SHIPPED_LEVELS: [(u64, &str, &str); 10] = [
    (0, "Новичок", "#808080"),
    (100, "Исследователь", "#2E8B57"),
    (300, "Знаток", "#4682B4"),
    (600, "Эксперт", "#8B4513"),
    (1000, "Профессор истории", "#FFD700"),
    (1500, "Легенда Воронежа", "#B22222"),
    (2100, "Хранитель истории", "#4B0082"),
    (2800, "Магистр истории", "#FF4500"),
    (3600, "Великий исследователь", "#00CED1"),
    (4500, "Император истории", "#FF69B4"),
];

/// An ordered, validated level table.
///
/// The first row is held apart from the rest so that lookups never need a
/// fallible index into an empty table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    base: LevelInfo,
    higher: Vec<LevelInfo>,
}

impl LevelTable {
    /// Build a table from `rows`, checking its ordering rules.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::InvalidLevelTable`] if the table is empty,
    /// does not start at level 1 with 0 XP, or if level numbers or XP
    /// requirements are not strictly increasing by row.
    pub fn new(rows: Vec<LevelInfo>) -> Result<Self, ProgressError> {
        let mut rows = rows.into_iter();
        let base = rows
            .next()
            .ok_or_else(|| ProgressError::InvalidLevelTable("table has no rows".to_owned()))?;
        if base.level != 1 || base.xp_required != 0 {
            return Err(ProgressError::InvalidLevelTable(format!(
                "first row must be level 1 at 0 XP, got level {} at {} XP",
                base.level, base.xp_required
            )));
        }

        let higher: Vec<LevelInfo> = rows.collect();
        let mut previous = &base;
        for row in &higher {
            if row.level <= previous.level {
                return Err(ProgressError::InvalidLevelTable(format!(
                    "level {} follows level {}",
                    row.level, previous.level
                )));
            }
            if row.xp_required <= previous.xp_required {
                return Err(ProgressError::InvalidLevelTable(format!(
                    "level {} needs {} XP, not more than level {} ({} XP)",
                    row.level, row.xp_required, previous.level, previous.xp_required
                )));
            }
            previous = row;
        }

        Ok(Self { base, higher })
    }

    /// The ten-level table the app ships with.
    pub fn shipped() -> Self {
        let row = |level: u32, &(xp_required, title, color): &(u64, &str, &str)| LevelInfo {
            level,
            xp_required,
            title: title.to_owned(),
            color: color.to_owned(),
        };
        let [first, rest @ ..] = &SHIPPED_LEVELS;
        Self {
            base: row(1, first),
            higher: rest
                .iter()
                .zip(2_u32..)
                .map(|(entry, level)| row(level, entry))
                .collect(),
        }
    }

    /// The shipped rows, for configuration defaults.
    pub fn shipped_rows() -> Vec<LevelInfo> {
        Self::shipped().rows().cloned().collect()
    }

    /// Every row, in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = &LevelInfo> {
        core::iter::once(&self.base).chain(self.higher.iter())
    }

    /// The starting row (level 1, 0 XP).
    pub const fn first(&self) -> &LevelInfo {
        &self.base
    }

    /// The highest row.
    pub fn last(&self) -> &LevelInfo {
        self.higher.last().unwrap_or(&self.base)
    }

    /// Number of rows.
    pub fn total_levels(&self) -> u32 {
        u32::try_from(self.higher.len().saturating_add(1)).unwrap_or(u32::MAX)
    }

    /// The highest level number.
    pub fn max_level(&self) -> u32 {
        self.last().level
    }

    /// The row for exactly `level`, if the table has one.
    pub fn get(&self, level: u32) -> Option<&LevelInfo> {
        self.rows().find(|row| row.level == level)
    }

    /// The row for `level`, falling back to the highest row.
    pub fn info(&self, level: u32) -> &LevelInfo {
        self.get(level).unwrap_or_else(|| self.last())
    }

    /// The first row above `level`, or `None` at the top of the table.
    pub fn next_after(&self, level: u32) -> Option<&LevelInfo> {
        self.rows().find(|row| row.level > level)
    }

    /// The row an XP total belongs to: the last row whose requirement is met.
    pub fn level_for_xp(&self, xp: u64) -> &LevelInfo {
        self.rows()
            .take_while(|row| row.xp_required <= xp)
            .last()
            .unwrap_or(&self.base)
    }

    /// Every row above `from_level` that `xp` reaches, in ascending order.
    ///
    /// Empty when `xp` does not reach the next row.
    pub fn climb(&self, from_level: u32, xp: u64) -> Vec<&LevelInfo> {
        let mut gained = Vec::new();
        let mut current = from_level;
        while let Some(next) = self.next_after(current) {
            if xp < next.xp_required {
                break;
            }
            gained.push(next);
            current = next.level;
        }
        gained
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::shipped()
    }
}
