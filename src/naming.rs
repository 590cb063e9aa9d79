//! Naming transforms for generated identifiers

use crate::options::FieldStyle;
use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Words that are the same in singular and plural
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
];

/// Irregular plurals, matched against the whole trailing word only
const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("women", "woman"),
    ("men", "man"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("dice", "die"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
];

/// Plural suffixes of the trailing word, first match wins
const RULES: &[(&str, &str)] = &[
    ("quizzes", "quiz"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("indices", "index"),
    ("aliases", "alias"),
    ("statuses", "status"),
    ("buses", "bus"),
    ("analyses", "analysis"),
    ("diagnoses", "diagnosis"),
    ("synopses", "synopsis"),
    ("parentheses", "parenthesis"),
    ("theses", "thesis"),
    ("crises", "crisis"),
    ("shoes", "shoe"),
    ("movies", "movie"),
    ("sses", "ss"),
    ("xes", "x"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("oes", "o"),
    ("ies", "y"),
    ("lves", "lf"),
    ("ss", "ss"),
    ("us", "us"),
    ("is", "is"),
    ("s", ""),
];

/// Message name for a table: `user_accounts` -> `UserAccounts`
pub fn message_name(table: &str) -> String {
    table.to_upper_camel_case()
}

/// Lower camel case, used as the fallback comment for a table
pub fn lower_camel(s: &str) -> String {
    s.to_lower_camel_case()
}

/// Apply a field naming style to a raw column name
pub fn field_name(raw: &str, style: FieldStyle) -> String {
    let camel = raw.to_lower_camel_case();
    match style {
        FieldStyle::LowerCamel => camel,
        FieldStyle::Snake => camel.to_snake_case(),
    }
}

/// Field name referring to a whole message: `UserInfo` -> `userInfo` / `user_info`
pub fn message_field_name(message: &str, style: FieldStyle) -> String {
    let mut chars = message.chars();
    let lowered = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    field_name(&lowered, style)
}

/// Enum type name for a column: `users` + `status` -> `UserStatus`
pub fn enum_name(table: &str, column: &str) -> String {
    format!(
        "{}{}",
        singularize(&table.to_upper_camel_case()),
        column.to_upper_camel_case()
    )
}

/// Enum value name: uppercase, every run of non-word characters becomes `_`
pub fn enum_value_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_uppercase());
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Singularize the trailing word of an identifier
///
/// The trailing word starts at the last uppercase letter (or the start of
/// the identifier). Case of the first replaced character is kept, so
/// `UserAccounts` becomes `UserAccount` and `People` becomes `Person`.
pub fn singularize(word: &str) -> String {
    let start = word
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_ascii_uppercase())
        .map_or(0, |(i, _)| i);
    let last = word[start..].to_ascii_lowercase();

    if UNCOUNTABLE.contains(&last.as_str()) {
        return word.to_string();
    }

    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == last) {
        return replace_suffix(word, start, singular);
    }

    // a rule may consume the whole word only if it leaves something behind
    let rule = RULES.iter().find(|(plural, singular)| {
        last.ends_with(plural) && (last.len() > plural.len() || !singular.is_empty())
    });

    match rule {
        Some((plural, singular)) => replace_suffix(word, word.len() - plural.len(), singular),
        None => word.to_string(),
    }
}

fn replace_suffix(word: &str, start: usize, replacement: &str) -> String {
    let (head, tail) = word.split_at(start);
    let capitalize = tail.chars().next().is_some_and(|c| c.is_ascii_uppercase());

    let mut out = String::with_capacity(start + replacement.len());
    out.push_str(head);
    if capitalize {
        let mut chars = replacement.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    } else {
        out.push_str(replacement);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_name() {
        assert_eq!(message_name("users"), "Users");
        assert_eq!(message_name("user_info"), "UserInfo");
    }

    #[test]
    fn test_field_name_styles() {
        assert_eq!(field_name("create_time", FieldStyle::Snake), "create_time");
        assert_eq!(field_name("create_time", FieldStyle::LowerCamel), "createTime");
        assert_eq!(field_name("id", FieldStyle::LowerCamel), "id");
    }

    #[test]
    fn test_message_field_name() {
        assert_eq!(message_field_name("UserInfo", FieldStyle::LowerCamel), "userInfo");
        assert_eq!(message_field_name("UserInfo", FieldStyle::Snake), "user_info");
        assert_eq!(message_field_name("", FieldStyle::Snake), "");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("Users"), "User");
        assert_eq!(singularize("Categories"), "Category");
        assert_eq!(singularize("Boxes"), "Box");
        assert_eq!(singularize("Addresses"), "Address");
        assert_eq!(singularize("People"), "Person");
        assert_eq!(singularize("UserPeople"), "UserPerson");
        assert_eq!(singularize("Status"), "Status");
        assert_eq!(singularize("Statuses"), "Status");
        assert_eq!(singularize("Buses"), "Bus");
        assert_eq!(singularize("Aliases"), "Alias");
        assert_eq!(singularize("Quizzes"), "Quiz");
        assert_eq!(singularize("Indices"), "Index");
        assert_eq!(singularize("OrderStatuses"), "OrderStatus");
        assert_eq!(singularize("News"), "News");
        assert_eq!(singularize("User"), "User");
        assert_eq!(singularize("S"), "S");
    }

    #[test]
    fn test_singularize_respects_word_boundaries() {
        assert_eq!(singularize("Specimen"), "Specimen");
        assert_eq!(singularize("Regimen"), "Regimen");
        assert_eq!(singularize("Omen"), "Omen");
        assert_eq!(singularize("Men"), "Man");
        assert_eq!(singularize("SalesWomen"), "SalesWoman");
        assert_eq!(singularize("Selfish"), "Selfish");
        assert_eq!(singularize("FishTanks"), "FishTank");
        assert_eq!(singularize("TvSeries"), "TvSeries");
    }

    #[test]
    fn test_singularize_common_plurals() {
        assert_eq!(singularize("Knives"), "Knife");
        assert_eq!(singularize("Shelves"), "Shelf");
        assert_eq!(singularize("Analyses"), "Analysis");
        assert_eq!(singularize("Crises"), "Crisis");
        assert_eq!(singularize("Horseshoes"), "Horseshoe");
        assert_eq!(singularize("Movies"), "Movie");
        assert_eq!(singularize("Databases"), "Database");
        assert_eq!(singularize("Archives"), "Archive");
    }

    #[test]
    fn test_enum_name() {
        assert_eq!(enum_name("users", "status"), "UserStatus");
        assert_eq!(enum_name("order_items", "pay_state"), "OrderItemPayState");
    }

    #[test]
    fn test_enum_value_name() {
        assert_eq!(enum_value_name("active"), "ACTIVE");
        assert_eq!(enum_value_name("in-progress"), "IN_PROGRESS");
        assert_eq!(enum_value_name("a  b--c"), "A_B_C");
        assert_eq!(enum_value_name("café"), "CAF_");
        assert_eq!(enum_value_name("snake_case"), "SNAKE_CASE");
    }
}
