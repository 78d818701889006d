use std::fmt;

use thiserror::Error;

use crate::constants::{DEFAULT_CONCERNS, DEFAULT_LOCATION};

/// Primary water source offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaterSource {
    #[default]
    Borewell,
    Handpump,
    RiverStream,
    CommunityTap,
    RainwaterHarvesting,
    Other,
}

impl WaterSource {
    pub fn all() -> &'static [WaterSource] {
        &[
            WaterSource::Borewell,
            WaterSource::Handpump,
            WaterSource::RiverStream,
            WaterSource::CommunityTap,
            WaterSource::RainwaterHarvesting,
            WaterSource::Other,
        ]
    }

    /// Label shown in the select control (and sent to the report backend).
    pub fn label(&self) -> &'static str {
        match self {
            WaterSource::Borewell => "Borewell",
            WaterSource::Handpump => "Handpump",
            WaterSource::RiverStream => "River / Stream",
            WaterSource::CommunityTap => "Community Tap",
            WaterSource::RainwaterHarvesting => "Rainwater Harvesting",
            WaterSource::Other => "Other",
        }
    }

    /// Parse a label case-insensitively. Accepts "River/Stream" without spaces too.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        Self::all().iter().copied().find(|s| {
            let candidate: String = s
                .label()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            candidate == wanted
        })
    }

    fn index(&self) -> usize {
        Self::all().iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for WaterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values captured from the intake form.
///
/// A clone taken at submit time is the snapshot that one generation cycle
/// works from, however the fields are edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInputs {
    pub location: String,
    pub water_source: WaterSource,
    pub concerns: String,
}

impl Default for FormInputs {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            water_source: WaterSource::default(),
            concerns: DEFAULT_CONCERNS.to_string(),
        }
    }
}

/// Why a submission was refused before reaching the report backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("location is required")]
    MissingLocation,
    #[error("please describe your concerns")]
    MissingConcerns,
}

/// Which form control has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Location,
    WaterSource,
    Concerns,
    Submit,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Location => FormField::WaterSource,
            FormField::WaterSource => FormField::Concerns,
            FormField::Concerns => FormField::Submit,
            FormField::Submit => FormField::Location,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Location => FormField::Submit,
            FormField::WaterSource => FormField::Location,
            FormField::Concerns => FormField::WaterSource,
            FormField::Submit => FormField::Concerns,
        }
    }
}

/// Single-line text buffer with a byte-offset cursor kept on char boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole value and park the cursor at the end.
    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.value[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.value[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.value[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.value.len());
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.value.len();
    }
}

/// Owner of the intake form fields.
///
/// Field values change only through the setters; keystroke editing happens
/// on a draft that is committed when editing ends.
#[derive(Debug, Clone)]
pub struct FormState {
    location: TextInput,
    water_source: WaterSource,
    concerns: TextInput,
    pub focus: FormField,
}

impl FormState {
    pub fn new(inputs: &FormInputs) -> Self {
        Self {
            location: TextInput::new(&inputs.location),
            water_source: inputs.water_source,
            concerns: TextInput::new(&inputs.concerns),
            focus: FormField::Location,
        }
    }

    pub fn location(&self) -> &str {
        self.location.value()
    }

    pub fn water_source(&self) -> WaterSource {
        self.water_source
    }

    pub fn concerns(&self) -> &str {
        self.concerns.value()
    }

    pub fn set_location(&mut self, value: &str) {
        self.location.set(value);
    }

    pub fn set_water_source(&mut self, source: WaterSource) {
        self.water_source = source;
    }

    pub fn set_concerns(&mut self, value: &str) {
        self.concerns.set(value);
    }

    /// Copy the current field values out.
    pub fn snapshot(&self) -> FormInputs {
        FormInputs {
            location: self.location.value().to_string(),
            water_source: self.water_source,
            concerns: self.concerns.value().to_string(),
        }
    }

    /// Both free-text fields are required.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.location.value().trim().is_empty() {
            return Err(FormError::MissingLocation);
        }
        if self.concerns.value().trim().is_empty() {
            return Err(FormError::MissingConcerns);
        }
        Ok(())
    }

    pub fn input(&self, field: FormField) -> Option<&TextInput> {
        match field {
            FormField::Location => Some(&self.location),
            FormField::Concerns => Some(&self.concerns),
            FormField::WaterSource | FormField::Submit => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn next_water_source(&mut self) {
        self.set_water_source(self.water_source.next());
    }

    pub fn prev_water_source(&mut self) {
        self.set_water_source(self.water_source.prev());
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(&FormInputs::default())
    }
}
