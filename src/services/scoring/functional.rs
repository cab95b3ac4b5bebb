use serde::Serialize;
use std::collections::HashMap;

use super::contains_term;

/// What a product is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Lighting,
    Sleeping,
    Seating,
    Workspace,
    Storage,
    Surface,
    Dining,
    Decor,
    General,
}

/// Checked in order, first match wins. Lighting precedes the tables so that
/// "table lamp" never reads as a dining table.
const FUNCTION_KEYWORDS: &[(Function, &[&str])] = &[
    (
        Function::Lighting,
        &["lamp", "lamps", "light", "lighting", "chandelier", "pendant", "sconce", "lantern"],
    ),
    (Function::Sleeping, &["bed", "mattress", "headboard", "bunk", "crib"]),
    (
        Function::Seating,
        &[
            "sofa", "couch", "sectional", "loveseat", "settee", "chair", "armchair", "recliner",
            "stool", "bench", "ottoman", "pouf",
        ],
    ),
    (Function::Workspace, &["desk", "study table", "workstation", "office"]),
    (
        Function::Storage,
        &[
            "wardrobe", "cabinet", "shelf", "shelves", "bookshelf", "bookcase", "dresser",
            "sideboard", "drawer", "drawers", "storage", "tv unit",
        ],
    ),
    (
        Function::Surface,
        &["coffee table", "side table", "end table", "console", "nightstand", "bedside table"],
    ),
    (Function::Dining, &["dining", "table"]),
    (
        Function::Decor,
        &[
            "mirror", "rug", "carpet", "vase", "planter", "art", "painting", "cushion", "clock",
            "curtain", "throw",
        ],
    ),
];

/// Infers a product's function from its text
pub fn infer_function(text: &str) -> Function {
    FUNCTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_term(text, k)))
        .map(|(function, _)| *function)
        .unwrap_or(Function::General)
}

/// Room types the functional table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    LivingRoom,
    Bedroom,
    DiningRoom,
    Kitchen,
    Office,
    Bathroom,
    Outdoor,
    Entryway,
    KidsRoom,
}

pub const ALL_ROOMS: [RoomType; 9] = [
    RoomType::LivingRoom,
    RoomType::Bedroom,
    RoomType::DiningRoom,
    RoomType::Kitchen,
    RoomType::Office,
    RoomType::Bathroom,
    RoomType::Outdoor,
    RoomType::Entryway,
    RoomType::KidsRoom,
];

pub const DEFAULT_ROOM: RoomType = RoomType::LivingRoom;

impl RoomType {
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        let room = match normalized.as_str() {
            "living_room" | "living" | "lounge" | "family_room" | "drawing_room" => {
                RoomType::LivingRoom
            }
            "bedroom" | "master_bedroom" | "guest_room" => RoomType::Bedroom,
            "dining_room" | "dining" => RoomType::DiningRoom,
            "kitchen" => RoomType::Kitchen,
            "office" | "home_office" | "study" => RoomType::Office,
            "bathroom" | "bath" => RoomType::Bathroom,
            "outdoor" | "patio" | "balcony" | "garden" | "terrace" => RoomType::Outdoor,
            "entryway" | "hallway" | "foyer" => RoomType::Entryway,
            "kids_room" | "nursery" | "playroom" => RoomType::KidsRoom,
            _ => return None,
        };
        Some(room)
    }

    /// Parses `value`, falling back to the living room
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(DEFAULT_ROOM)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoomType::LivingRoom => "living room",
            RoomType::Bedroom => "bedroom",
            RoomType::DiningRoom => "dining room",
            RoomType::Kitchen => "kitchen",
            RoomType::Office => "office",
            RoomType::Bathroom => "bathroom",
            RoomType::Outdoor => "outdoor space",
            RoomType::Entryway => "entryway",
            RoomType::KidsRoom => "kids' room",
        }
    }
}

// Columns follow ALL_ROOMS order.
const RULES: &[(Function, [f64; 9])] = &[
    (Function::Lighting, [0.9, 0.9, 0.85, 0.8, 0.9, 0.7, 0.6, 0.8, 0.8]),
    (Function::Sleeping, [0.2, 1.0, 0.1, 0.1, 0.2, 0.1, 0.2, 0.1, 0.9]),
    (Function::Seating, [1.0, 0.6, 0.7, 0.5, 0.7, 0.2, 0.8, 0.6, 0.6]),
    (Function::Workspace, [0.4, 0.6, 0.2, 0.2, 1.0, 0.1, 0.2, 0.2, 0.7]),
    (Function::Storage, [0.8, 0.9, 0.7, 0.7, 0.8, 0.6, 0.3, 0.8, 0.8]),
    (Function::Surface, [1.0, 0.7, 0.4, 0.3, 0.5, 0.2, 0.6, 0.6, 0.5]),
    (Function::Dining, [0.4, 0.1, 1.0, 0.8, 0.2, 0.1, 0.6, 0.1, 0.3]),
    (Function::Decor, [0.9, 0.8, 0.7, 0.6, 0.6, 0.6, 0.5, 0.8, 0.7]),
];

const UNLISTED_FIT: f64 = 0.5;

/// Immutable function × room compatibility table
#[derive(Debug, Clone)]
pub struct FunctionRules {
    entries: HashMap<Function, HashMap<RoomType, f64>>,
}

impl Default for FunctionRules {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRules {
    pub fn new() -> Self {
        let entries = RULES
            .iter()
            .map(|(function, row)| {
                let columns = ALL_ROOMS.iter().copied().zip(row.iter().copied()).collect();
                (*function, columns)
            })
            .collect();
        Self { entries }
    }

    pub fn fit(&self, function: Function, room: RoomType) -> f64 {
        self.entries
            .get(&function)
            .and_then(|row| row.get(&room))
            .copied()
            .unwrap_or(UNLISTED_FIT)
    }
}
