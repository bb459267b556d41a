//! Recipe records, filters and views

use super::{contains_ignore_case, normalize_labels, Viewer};
use crate::store::{OrderedRecord, Record, RecordFilter, SortValue};
use crate::types::comma_separated;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How hard a recipe is to cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Stored and wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Self::Easy),
            "MEDIUM" => Ok(Self::Medium),
            "HARD" => Ok(Self::Hard),
            other => Err(crate::Error::invalid_request(format!(
                "unknown difficulty '{other}'"
            ))),
        }
    }
}

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub difficulty: Difficulty,
    /// Minutes
    pub prep_time: Option<i64>,
    /// Minutes
    pub cooking_time: Option<i64>,
    pub author_id: String,
    /// Normalised tag names
    pub tags: Vec<String>,
    /// Normalised ingredient names
    pub ingredients: Vec<String>,
    pub likes_count: u64,
    pub favorites_count: u64,
    pub comments_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a public recipe with a fresh id, created now
    ///
    /// Timestamps are truncated to microseconds, the precision stores keep.
    pub fn new(author_id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            slug: slugify(&title),
            title,
            description: None,
            is_public: true,
            difficulty: Difficulty::default(),
            prep_time: None,
            cooking_time: None,
            author_id: author_id.into(),
            tags: Vec::new(),
            ingredients: Vec::new(),
            likes_count: 0,
            favorites_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_times(mut self, prep_time: Option<i64>, cooking_time: Option<i64>) -> Self {
        self.prep_time = prep_time;
        self.cooking_time = cooking_time;
        self
    }

    /// Set tags, normalising each name and dropping repeats
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<S> = tags.into_iter().collect();
        self.tags = normalize_labels(&tags);
        self
    }

    /// Set ingredients, normalising each name
    #[must_use]
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ingredients: Vec<S> = ingredients.into_iter().collect();
        self.ingredients = normalize_labels(&ingredients);
        self
    }

    /// Set both creation and update time
    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Whether `viewer` may see this recipe
    pub fn is_visible_to(&self, viewer_id: Option<&str>) -> bool {
        self.is_public || viewer_id == Some(self.author_id.as_str())
    }
}

impl Record for Recipe {
    fn id(&self) -> &str {
        &self.id
    }
}

impl OrderedRecord for Recipe {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            "title" => Some(self.title.as_str().into()),
            "slug" => Some(self.slug.as_str().into()),
            _ => None,
        }
    }
}

/// Turn a title into a URL slug: lowercase ASCII words joined by `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("recipe");
    }
    slug
}

/// Query parameters accepted by the recipe list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub max_prep_time: Option<i64>,
    #[serde(default)]
    pub max_cooking_time: Option<i64>,
}

impl RecipeQuery {
    /// Reject filter values no recipe could satisfy
    pub fn validate(&self) -> crate::Result<()> {
        let limits = [
            ("maxPrepTime", self.max_prep_time),
            ("maxCookingTime", self.max_cooking_time),
        ];
        for (name, value) in limits {
            if value.is_some_and(|minutes| minutes < 0) {
                return Err(crate::Error::invalid_request(format!(
                    "{name} must not be negative"
                )));
            }
        }
        Ok(())
    }

    /// Build the store filter for `viewer`
    pub fn into_filter(self, viewer: Option<&Viewer>) -> RecipeFilter {
        RecipeFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            is_public: self.is_public,
            difficulty: self.difficulty,
            tags: normalize_labels(&self.tags),
            ingredients: normalize_labels(&self.ingredients),
            max_prep_time: self.max_prep_time,
            max_cooking_time: self.max_cooking_time,
            viewer_id: viewer.map(|v| v.id.clone()),
        }
    }
}

/// Store filter for recipes
///
/// All conditions are combined with AND. Tags and ingredients must all be
/// present on a recipe. Recipes without a prep/cooking time never match a
/// maximum on that time. Private recipes are only visible to their author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub search: Option<String>,
    pub is_public: Option<bool>,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub max_prep_time: Option<i64>,
    pub max_cooking_time: Option<i64>,
    pub viewer_id: Option<String>,
}

impl RecipeFilter {
    /// Filter showing everything `viewer` may see
    pub fn visible_to(viewer: Option<&Viewer>) -> Self {
        Self {
            viewer_id: viewer.map(|v| v.id.clone()),
            ..Self::default()
        }
    }
}

fn within(value: Option<i64>, max: Option<i64>) -> bool {
    match max {
        None => true,
        Some(max) => value.is_some_and(|v| v <= max),
    }
}

impl RecordFilter<Recipe> for RecipeFilter {
    fn matches(&self, recipe: &Recipe) -> bool {
        recipe.is_visible_to(self.viewer_id.as_deref())
            && self
                .search
                .as_deref()
                .map_or(true, |s| contains_ignore_case(&recipe.title, s))
            && self.is_public.map_or(true, |p| recipe.is_public == p)
            && self.difficulty.map_or(true, |d| recipe.difficulty == d)
            && self.tags.iter().all(|t| recipe.tags.contains(t))
            && self.ingredients.iter().all(|i| recipe.ingredients.contains(i))
            && within(recipe.prep_time, self.max_prep_time)
            && within(recipe.cooking_time, self.max_cooking_time)
    }
}

/// Recipe as returned to clients (no author id, no update time)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub difficulty: Difficulty,
    pub prep_time: Option<i64>,
    pub cooking_time: Option<i64>,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub likes_count: u64,
    pub favorites_count: u64,
    pub comments_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeView {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            slug: recipe.slug,
            title: recipe.title,
            description: recipe.description,
            is_public: recipe.is_public,
            difficulty: recipe.difficulty,
            prep_time: recipe.prep_time,
            cooking_time: recipe.cooking_time,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
            likes_count: recipe.likes_count,
            favorites_count: recipe.favorites_count,
            comments_count: recipe.comments_count,
            created_at: recipe.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn carbonara() -> Recipe {
        Recipe::new("alice", "Spaghetti Carbonara")
            .with_difficulty(Difficulty::Medium)
            .with_times(Some(10), Some(15))
            .with_tags(["Italian", " pasta "])
            .with_ingredients(["Spaghetti", "Egg", "Guanciale"])
    }

    #[test_case("Spaghetti Carbonara", "spaghetti-carbonara")]
    #[test_case("  Mom's  Apple-Pie!! ", "moms-apple-pie")]
    #[test_case("pad_thai 2", "pad-thai-2")]
    #[test_case("!!!", "recipe")]
    fn test_slugify(title: &str, expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[test]
    fn test_new_recipe_normalises() {
        let recipe = carbonara();
        assert_eq!(recipe.slug, "spaghetti-carbonara");
        assert_eq!(recipe.tags, vec!["italian", "pasta"]);
        assert_eq!(recipe.ingredients, vec!["spaghetti", "egg", "guanciale"]);
        assert!(recipe.is_public);
        assert_eq!(recipe.created_at, recipe.updated_at);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(
            serde_json::to_string(&Difficulty::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }

    #[test]
    fn test_visibility() {
        let private = carbonara().private();
        assert!(!RecipeFilter::visible_to(None).matches(&private));
        assert!(!RecipeFilter::visible_to(Some(&Viewer::new("bob"))).matches(&private));
        assert!(RecipeFilter::visible_to(Some(&Viewer::new("alice"))).matches(&private));
        assert!(RecipeFilter::visible_to(None).matches(&carbonara()));
    }

    #[test]
    fn test_filter_conditions() {
        let recipe = carbonara();
        let base = RecipeFilter::default();

        let search = RecipeFilter {
            search: Some("CARBO".into()),
            ..base.clone()
        };
        assert!(search.matches(&recipe));

        let tags = RecipeFilter {
            tags: vec!["italian".into(), "pasta".into()],
            ..base.clone()
        };
        assert!(tags.matches(&recipe));

        let missing_tag = RecipeFilter {
            tags: vec!["italian".into(), "vegan".into()],
            ..base.clone()
        };
        assert!(!missing_tag.matches(&recipe));

        let ingredients = RecipeFilter {
            ingredients: vec!["egg".into()],
            ..base.clone()
        };
        assert!(ingredients.matches(&recipe));

        let too_slow = RecipeFilter {
            max_cooking_time: Some(10),
            ..base.clone()
        };
        assert!(!too_slow.matches(&recipe));

        let quick_enough = RecipeFilter {
            max_prep_time: Some(10),
            max_cooking_time: Some(15),
            difficulty: Some(Difficulty::Medium),
            is_public: Some(true),
            ..base
        };
        assert!(quick_enough.matches(&recipe));
    }

    #[test]
    fn test_max_time_excludes_unknown_times() {
        let recipe = carbonara().with_times(None, None);
        let filter = RecipeFilter {
            max_prep_time: Some(60),
            ..RecipeFilter::default()
        };
        assert!(!filter.matches(&recipe));
    }

    #[test_case(Some(-1), None, Some("maxPrepTime must not be negative") ; "negative prep time")]
    #[test_case(None, Some(-30), Some("maxCookingTime must not be negative") ; "negative cooking time")]
    #[test_case(Some(0), Some(0), None ; "zero is allowed")]
    fn test_query_validate(prep: Option<i64>, cooking: Option<i64>, error: Option<&str>) {
        let query = RecipeQuery {
            max_prep_time: prep,
            max_cooking_time: cooking,
            ..RecipeQuery::default()
        };

        match (query.validate(), error) {
            (Ok(()), None) => {}
            (Err(crate::Error::InvalidRequest { message }), Some(expected)) => {
                assert_eq!(message, expected);
            }
            (other, expected) => panic!("unexpected result {other:?}, wanted {expected:?}"),
        }
    }

    #[test]
    fn test_query_into_filter() {
        let query: RecipeQuery = serde_json::from_str(
            r#"{"search":" ","isPublic":true,"difficulty":"EASY","tags":"Vegan,Quick","maxPrepTime":20}"#,
        )
        .unwrap();
        let filter = query.into_filter(Some(&Viewer::new("alice")));

        assert_eq!(filter.search, None);
        assert_eq!(filter.is_public, Some(true));
        assert_eq!(filter.difficulty, Some(Difficulty::Easy));
        assert_eq!(filter.tags, vec!["vegan", "quick"]);
        assert_eq!(filter.max_prep_time, Some(20));
        assert_eq!(filter.viewer_id.as_deref(), Some("alice"));
    }

    #[test]
    fn test_view_hides_internal_fields() {
        let view = RecipeView::from(carbonara());
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("authorId").is_none());
        assert!(json.get("updatedAt").is_none());
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["prepTime"], 10);
        assert_eq!(json["likesCount"], 0);
    }

    #[test]
    fn test_sort_values() {
        let recipe = carbonara();
        assert_eq!(
            recipe.sort_value("created_at"),
            Some(SortValue::Timestamp(recipe.created_at))
        );
        assert_eq!(
            recipe.sort_value("title"),
            Some(SortValue::Text("Spaghetti Carbonara".into()))
        );
        assert_eq!(recipe.sort_value("author_id"), None);
    }
}
