//! Wikidata property identifiers the pipeline reads.

/// Country (P17).
pub const COUNTRY: &str = "P17";
/// Image file on Commons (P18).
pub const IMAGE: &str = "P18";
/// Place of birth (P19).
pub const PLACE_OF_BIRTH: &str = "P19";
/// Place of death (P20).
pub const PLACE_OF_DEATH: &str = "P20";
/// Sex or gender (P21).
pub const GENDER: &str = "P21";
/// Country of citizenship (P27).
pub const CITIZENSHIP: &str = "P27";
/// Occupation (P106).
pub const OCCUPATION: &str = "P106";
/// Located in administrative territorial entity (P131).
pub const LOCATED_IN: &str = "P131";
/// Cause of death (P509).
pub const CAUSE_OF_DEATH: &str = "P509";
/// Date of birth (P569).
pub const BIRTH_DATE: &str = "P569";
/// Date of death (P570).
pub const DEATH_DATE: &str = "P570";
/// Coordinate location (P625).
pub const COORDINATES: &str = "P625";
