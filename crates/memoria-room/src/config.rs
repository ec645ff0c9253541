//! Room defaults.

/// Maximum number of connections seated in one room.
pub const ROOM_CAPACITY: usize = 2;

/// The stock room labels, in id order (the first gets id 1).
pub const DEFAULT_ROOM_NAMES: [&str; 9] = [
    "D5",
    "D6",
    "D7",
    "Cafeteria",
    "Côn Sơn",
    "Trường Sa",
    "Hoàng Sa",
    "Cát Bà",
    "2023",
];

/// [`DEFAULT_ROOM_NAMES`] as owned strings, ready for
/// [`RoomRegistry::new`](crate::RoomRegistry::new).
pub fn default_room_names() -> Vec<String> {
    DEFAULT_ROOM_NAMES.iter().map(|n| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_room_names_has_nine_rooms() {
        let names = default_room_names();
        assert_eq!(names.len(), 9);
        assert_eq!(names[0], "D5");
        assert_eq!(names[8], "2023");
    }

    #[test]
    fn test_room_capacity_is_two() {
        assert_eq!(ROOM_CAPACITY, 2);
    }
}
