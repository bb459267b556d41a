//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, PageArgs};
use crate::cli::server::{self, AppState};
use crate::config::AppConfig;
use crate::database::Database;
use crate::domain::{Difficulty, Recipe, RecipeQuery, Role, User, UserFilter, Viewer};
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{Page, PageParams};
use crate::service::{RecipeService, UserService};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

const SEED_TAGS: &[&str] = &[
    "vegan",
    "vegetarian",
    "quick",
    "dessert",
    "breakfast",
    "spicy",
    "gluten-free",
];

const SEED_INGREDIENTS: &[&str] = &[
    "garlic", "onion", "tomato", "rice", "chickpeas", "butter", "flour", "egg", "lemon", "basil",
];

const SEED_DISHES: &[&str] = &[
    "Pad Thai",
    "Tomato Soup",
    "Lemon Tart",
    "Chickpea Curry",
    "Garlic Bread",
    "Fried Rice",
    "Pancakes",
    "Basil Pesto",
];

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Serve { port } => self.serve(config, *port).await,
            Commands::Seed { users, recipes } => self.seed(&config, *users, *recipes).await,
            Commands::Recipes {
                page,
                search,
                tags,
                ingredients,
                viewer,
            } => {
                let query = RecipeQuery {
                    search: search.clone(),
                    tags: split_list(tags.as_deref()),
                    ingredients: split_list(ingredients.as_deref()),
                    ..RecipeQuery::default()
                };
                let viewer = viewer.as_deref().map(Viewer::new);
                self.recipes(&config, page, query, viewer).await
            }
            Commands::Users { page, role, search } => {
                let role = role.as_deref().map(str::parse::<Role>).transpose()?;
                let filter = UserFilter {
                    role,
                    search: search.clone(),
                };
                self.users(&config, page, filter).await
            }
            Commands::Config => self.print_config(&config),
        }
    }

    /// Load configuration, then apply command-line overrides
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;
        if let Some(path) = &self.cli.database {
            config.database.path.clone_from(path);
        }
        Ok(config)
    }

    fn open_database(config: &AppConfig) -> Result<Database> {
        tracing::debug!("Opening database at {}", config.database.path);
        Database::open(&config.database.path)
    }

    /// Build both list services over the configured database
    fn app_state(config: &AppConfig, db: &Database) -> AppState {
        let policy = config.database.missing_cursor;
        AppState {
            recipes: RecipeService::new(Arc::new(db.recipes(policy)), config.pagination),
            users: UserService::new(Arc::new(db.users(policy)), config.pagination),
        }
    }

    /// Start HTTP server mode
    async fn serve(&self, mut config: AppConfig, port: Option<u16>) -> Result<()> {
        if let Some(port) = port {
            config.server.port = port;
        }
        let db = Self::open_database(&config)?;
        let state = Self::app_state(&config, &db);
        server::serve(&config.server, state).await
    }

    /// Insert demo users and recipes
    async fn seed(&self, config: &AppConfig, users: usize, recipes: usize) -> Result<()> {
        if users == 0 && recipes > 0 {
            return Err(Error::invalid_request(
                "at least one user is needed to author recipes",
            ));
        }

        let start = Instant::now();
        let db = Self::open_database(config)?;

        let mut authors = Vec::with_capacity(users);
        for n in 0..users {
            let role = if n == 0 { Role::Admin } else { Role::User };
            let email = format!("cook{}@example.com", n + 1);
            let user = User::new(email.as_str())
                .with_name(format!("Cook {}", n + 1))
                .with_role(role);
            let user = db
                .insert_user(user)
                .await
                .with_context(|| format!("Failed to seed user {email}"))?;
            authors.push(user);
        }
        tracing::info!("Seeded {} users", authors.len());

        for n in 0..recipes {
            let author = &authors[n % authors.len()];
            let recipe = db.insert_recipe(seed_recipe(n, &author.id)).await?;
            tracing::debug!(id = %recipe.id, slug = %recipe.slug, "Seeded recipe");
        }
        tracing::info!("Seeded {} recipes", recipes);

        let (recipe_rows, user_rows) = db.row_counts().await?;
        self.output_message(&json!({
            "database": db.path(),
            "recipes": recipe_rows,
            "users": user_rows,
            "elapsed_ms": start.elapsed().as_millis(),
        }));
        Ok(())
    }

    /// Print recipes, one page or all of them
    async fn recipes(
        &self,
        config: &AppConfig,
        args: &PageArgs,
        query: RecipeQuery,
        viewer: Option<Viewer>,
    ) -> Result<()> {
        let db = Self::open_database(config)?;
        let service = Self::app_state(config, &db).recipes;

        let mut params = PageParams::new(args.cursor.clone(), args.take);
        loop {
            let page = service
                .list(viewer.as_ref(), query.clone(), &params)
                .await?;
            if !self.emit_page(&page, args, &mut params)? {
                return Ok(());
            }
        }
    }

    /// Print users, one page or all of them
    async fn users(&self, config: &AppConfig, args: &PageArgs, filter: UserFilter) -> Result<()> {
        let db = Self::open_database(config)?;
        let service = Self::app_state(config, &db).users;

        let mut params = PageParams::new(args.cursor.clone(), args.take);
        loop {
            let page = service.list(filter.clone(), &params).await?;
            if !self.emit_page(&page, args, &mut params)? {
                return Ok(());
            }
        }
    }

    /// Print a page and advance `params`; returns whether to keep going
    fn emit_page<T: Serialize>(
        &self,
        page: &Page<T>,
        args: &PageArgs,
        params: &mut PageParams,
    ) -> Result<bool> {
        self.output_message(&serde_json::to_value(page)?);

        match (&page.next_cursor, args.all) {
            (Some(cursor), true) => {
                params.cursor = Some(cursor.as_str().to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Print the effective configuration
    fn print_config(&self, config: &AppConfig) -> Result<()> {
        print!("{}", config.to_yaml()?);
        Ok(())
    }

    /// Output a JSON message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{msg}");
            }
            OutputFormat::Pretty => {
                if let Ok(pretty) = serde_json::to_string_pretty(msg) {
                    println!("{pretty}");
                }
            }
        }
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The `n`th demo recipe
///
/// Every fifth recipe is private and every seventh has no prep time.
fn seed_recipe(n: usize, author_id: &str) -> Recipe {
    let dish = SEED_DISHES[n % SEED_DISHES.len()];
    let tags = [SEED_TAGS[n % SEED_TAGS.len()], SEED_TAGS[(n * 3 + 1) % SEED_TAGS.len()]];
    let ingredients = [
        SEED_INGREDIENTS[n % SEED_INGREDIENTS.len()],
        SEED_INGREDIENTS[(n + 4) % SEED_INGREDIENTS.len()],
        SEED_INGREDIENTS[(n * 7 + 2) % SEED_INGREDIENTS.len()],
    ];
    let difficulty = match n % 3 {
        0 => Difficulty::Easy,
        1 => Difficulty::Medium,
        _ => Difficulty::Hard,
    };
    let prep_time = (n % 7 != 0).then_some(5 + (n as i64 % 6) * 5);

    let recipe = Recipe::new(author_id, dish)
        .with_description(format!("Demo recipe #{}", n + 1))
        .with_difficulty(difficulty)
        .with_times(prep_time, Some(10 + (n as i64 % 4) * 15))
        .with_tags(tags)
        .with_ingredients(ingredients);

    if n % 5 == 4 {
        recipe.private()
    } else {
        recipe
    }
}
