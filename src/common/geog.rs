//! The fixed USPS/FIPS state table.

/// (postal code, two-digit FIPS, display name) for the 50 states,
/// DC, and PR. FIPS strings keep their leading zeros.
const STATE_TABLE: &[(&str, &str, &str)] = &[
    ("AL", "01", "Alabama"),
    ("AK", "02", "Alaska"),
    ("AZ", "04", "Arizona"),
    ("AR", "05", "Arkansas"),
    ("CA", "06", "California"),
    ("CO", "08", "Colorado"),
    ("CT", "09", "Connecticut"),
    ("DE", "10", "Delaware"),
    ("DC", "11", "District of Columbia"),
    ("FL", "12", "Florida"),
    ("GA", "13", "Georgia"),
    ("HI", "15", "Hawaii"),
    ("ID", "16", "Idaho"),
    ("IL", "17", "Illinois"),
    ("IN", "18", "Indiana"),
    ("IA", "19", "Iowa"),
    ("KS", "20", "Kansas"),
    ("KY", "21", "Kentucky"),
    ("LA", "22", "Louisiana"),
    ("ME", "23", "Maine"),
    ("MD", "24", "Maryland"),
    ("MA", "25", "Massachusetts"),
    ("MI", "26", "Michigan"),
    ("MN", "27", "Minnesota"),
    ("MS", "28", "Mississippi"),
    ("MO", "29", "Missouri"),
    ("MT", "30", "Montana"),
    ("NE", "31", "Nebraska"),
    ("NV", "32", "Nevada"),
    ("NH", "33", "New Hampshire"),
    ("NJ", "34", "New Jersey"),
    ("NM", "35", "New Mexico"),
    ("NY", "36", "New York"),
    ("NC", "37", "North Carolina"),
    ("ND", "38", "North Dakota"),
    ("OH", "39", "Ohio"),
    ("OK", "40", "Oklahoma"),
    ("OR", "41", "Oregon"),
    ("PA", "42", "Pennsylvania"),
    ("RI", "44", "Rhode Island"),
    ("SC", "45", "South Carolina"),
    ("SD", "46", "South Dakota"),
    ("TN", "47", "Tennessee"),
    ("TX", "48", "Texas"),
    ("UT", "49", "Utah"),
    ("VT", "50", "Vermont"),
    ("VA", "51", "Virginia"),
    ("WA", "53", "Washington"),
    ("WV", "54", "West Virginia"),
    ("WI", "55", "Wisconsin"),
    ("WY", "56", "Wyoming"),
    ("PR", "72", "Puerto Rico"),
];

/// Return the two-digit FIPS string for a USPS postal code.
pub fn state_abbr_to_fips(code: &str) -> Option<&'static str> {
    STATE_TABLE.iter().find(|(abbr, _, _)| *abbr == code).map(|(_, fips, _)| *fips)
}

/// Return the USPS postal code for a two-digit FIPS string.
pub fn state_fips_to_abbr(fips: &str) -> Option<&'static str> {
    STATE_TABLE.iter().find(|(_, f, _)| *f == fips).map(|(abbr, _, _)| *abbr)
}

/// Return the display name for a USPS postal code.
pub fn state_name(code: &str) -> Option<&'static str> {
    STATE_TABLE.iter().find(|(abbr, _, _)| *abbr == code).map(|(_, _, name)| *name)
}

/// Iterate over every postal code in the table.
pub fn all_state_codes() -> impl Iterator<Item = &'static str> {
    STATE_TABLE.iter().map(|(abbr, _, _)| *abbr)
}
