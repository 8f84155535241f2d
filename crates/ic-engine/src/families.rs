//! Fixed narrative shapes and the safe-choice pool.
//!
//! Both tables are versioned together. Changing any text or shape here
//! changes generated output for existing seeds, so bump
//! [`FAMILY_SET_VERSION`] when editing them.

/// Version of the family and safe-choice tables.
pub const FAMILY_SET_VERSION: &str = "v1";

/// Prompt used when no descriptive words are available.
pub const GENERIC_PROMPT: &str = "You pause and take in your surroundings.";

/// A narrative shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    /// Stable family id.
    pub id: &'static str,
    /// Title pattern; `{place}` is the place's display name.
    pub title: &'static str,
    /// Prompt frames; `{w1}` and `{w2}` are descriptive words.
    pub frames: &'static [&'static str],
    /// The shape preferred for the first choice.
    pub lead: ChoiceShape,
}

impl Family {
    /// The versioned template id recorded in debug metadata.
    pub fn template_id(&self) -> String {
        format!("{}@{FAMILY_SET_VERSION}", self.id)
    }
}

/// The fixed family set.
pub const FAMILIES: &[Family] = &[
    Family {
        id: "arrival",
        title: "Arriving at {place}",
        frames: &[
            "You arrive where the air feels {w1}.",
            "Everything here is {w1} and {w2}.",
        ],
        lead: ChoiceShape::Linger,
    },
    Family {
        id: "small_find",
        title: "A Small Find",
        frames: &[
            "Something {w1} catches your eye.",
            "Half-hidden, something {w1} waits to be found.",
        ],
        lead: ChoiceShape::Gather,
    },
    Family {
        id: "offer_help",
        title: "A Little Kindness",
        frames: &["A {w1} moment asks for a small kindness."],
        lead: ChoiceShape::Offer,
    },
    Family {
        id: "quiet_notice",
        title: "Quiet Noticing",
        frames: &[
            "It is {w1} here, and {w2}.",
            "You notice how {w1} the light is.",
        ],
        lead: ChoiceShape::SetFlag("noticed_detail"),
    },
    Family {
        id: "threshold_call",
        title: "The Edge of {place}",
        frames: &[
            "The way ahead feels {w1}.",
            "A {w1} hush gathers at the edge of things.",
        ],
        lead: ChoiceShape::Wander,
    },
];

/// What a safe choice does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceShape {
    /// Nothing changes.
    Linger,
    /// Set one flag.
    SetFlag(&'static str),
    /// Clear one flag the player has.
    ClearFlag(&'static str),
    /// Add one local item.
    Gather,
    /// Remove one held item.
    Offer,
    /// Remove one held item and add one local item.
    Trade,
    /// Move to another place in the zone. Rare.
    Wander,
}

impl ChoiceShape {
    /// Whether the shape needs nothing from state or content.
    pub fn is_unconditional(self) -> bool {
        matches!(self, Self::Linger | Self::SetFlag(_))
    }
}

/// One entry of the safe-choice pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeChoice {
    /// The effect shape.
    pub shape: ChoiceShape,
    /// Label pattern; `{item}`, `{held}` and `{place}` are filled in.
    pub label: &'static str,
}

/// The fixed pool every generated choice is drawn from.
pub const SAFE_CHOICES: &[SafeChoice] = &[
    SafeChoice {
        shape: ChoiceShape::Linger,
        label: "Sit quietly for a while",
    },
    SafeChoice {
        shape: ChoiceShape::Linger,
        label: "Listen to the sounds around you",
    },
    SafeChoice {
        shape: ChoiceShape::Linger,
        label: "Take a slow breath and look around",
    },
    SafeChoice {
        shape: ChoiceShape::SetFlag("noticed_detail"),
        label: "Make a note of something small",
    },
    SafeChoice {
        shape: ChoiceShape::SetFlag("rested"),
        label: "Rest your feet for a moment",
    },
    SafeChoice {
        shape: ChoiceShape::ClearFlag("rested"),
        label: "Stretch and get moving again",
    },
    SafeChoice {
        shape: ChoiceShape::Gather,
        label: "Gather a little {item}",
    },
    SafeChoice {
        shape: ChoiceShape::Offer,
        label: "Leave some {held} as a gift",
    },
    SafeChoice {
        shape: ChoiceShape::Trade,
        label: "Trade some {held} for a little {item}",
    },
    SafeChoice {
        shape: ChoiceShape::Wander,
        label: "Wander toward {place}",
    },
];
