//! Naming helpers shared by the compiler and the generator.
//!
//! Case conversion goes through `convert_case`; pluralisation is a small rule table
//! covering the English forms that show up in entity and table names.

use convert_case::{Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should be valid")
});

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("status", "statuses"),
    ("bus", "buses"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "data",
    "metadata",
    "feedback",
];

/// `blog_post` / `blogPost` / `blog-post` → `BlogPost`
pub fn studly(s: &str) -> String {
    s.to_case(Case::UpperCamel)
}

/// `BlogPost` / `blog_post` → `blogPost`
pub fn camel(s: &str) -> String {
    s.to_case(Case::Camel)
}

/// `BlogPost` → `blog_post`
pub fn snake(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Whether `s` can be used verbatim as a PHP identifier / column name.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Pluralise the last word of a snake_case or StudlyCase name.
///
/// ```rust
/// use modmaker::naming::plural;
/// assert_eq!(plural("category"), "categories");
/// assert_eq!(plural("blog_post"), "blog_posts");
/// ```
pub fn plural(s: &str) -> String {
    map_last_word(s, plural_word)
}

/// Inverse of [`plural`] for the rule table it covers.
pub fn singular(s: &str) -> String {
    map_last_word(s, singular_word)
}

/// `Post` → `posts`, `BlogCategory` → `blog_categories`
pub fn table_name(entity: &str) -> String {
    plural(&snake(entity))
}

/// `users` → `User`, `blog_categories` → `BlogCategory`
pub fn model_for_table(table: &str) -> String {
    studly(&singular(table))
}

fn map_last_word(s: &str, f: fn(&str) -> String) -> String {
    // Split on the last word boundary, either an underscore or an upper-case letter.
    let split = s
        .char_indices()
        .filter(|(i, c)| *c == '_' || (*i > 0 && c.is_uppercase()))
        .map(|(i, c)| if c == '_' { i + 1 } else { i })
        .last()
        .unwrap_or(0);
    let (head, last) = s.split_at(split);
    if last.is_empty() {
        return s.to_string();
    }
    let lower = last.to_lowercase();
    let mapped = f(&lower);
    let mapped = if last.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = mapped.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    } else {
        mapped
    };
    format!("{head}{mapped}")
}

fn plural_word(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, p)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
        return (*p).to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) && !stem.is_empty() {
            return format!("{stem}ies");
        }
    }
    if word.ends_with("ss")
        || word.ends_with("sh")
        || word.ends_with("ch")
        || word.ends_with('x')
        || word.ends_with('z')
        || (word.ends_with('s') && !word.ends_with("us"))
    {
        if word.ends_with('s') && !word.ends_with("ss") {
            // Already plural.
            return word.to_string();
        }
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix("us") {
        return format!("{stem}uses");
    }
    format!("{word}s")
}

fn singular_word(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((s, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
        return (*s).to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "shes", "ches", "xes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}
