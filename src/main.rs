use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::info;

use meal_planner::api::{ApiClient, MealBackend, RecipeBackend, ShoppingBackend};
use meal_planner::config::{AppConfig, LoggingConfig};
use meal_planner::filter::{sort_recipes, FilterEngine, FilterState, SortOrder};
use meal_planner::localization::{detect_language, LocalizationManager};
use meal_planner::observability::init_logging;
use meal_planner::quantity::{format_quantity, parse_quantity};
use meal_planner::shopping::{breakdown_tooltip, group_by_category, ShoppingListState};

/// meal-planner - browse recipes, meals and the shopping list
#[derive(Parser)]
#[command(name = "meal-planner")]
#[command(about = "Recipe and meal planning from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recipes matching the given filters
    Recipes {
        /// Text to look for in recipe names
        #[arg(long)]
        search: Option<String>,

        /// Recipe category (repeatable)
        #[arg(long)]
        category: Vec<String>,

        /// Meal type such as "dinner" or "side" (repeatable)
        #[arg(long = "meal-type")]
        meal_type: Vec<String>,

        /// Dietary preference such as "vegan" (repeatable)
        #[arg(long)]
        diet: Vec<String>,

        /// Only favorite recipes
        #[arg(long)]
        favorites: bool,

        /// Maximum total time in minutes
        #[arg(long = "max-time")]
        max_time: Option<u32>,

        /// Only recipes added in the last N days
        #[arg(long = "new-days")]
        new_days: Option<u32>,

        /// Quick filter id to switch on (repeatable)
        #[arg(long)]
        quick: Vec<String>,

        /// name, name-desc, newest, quickest or favorites
        #[arg(long, default_value = "name")]
        sort: SortOrder,
    },
    /// Show the shopping list
    Shopping {
        /// Rebuild the list from the planner week starting on this date (YYYY-MM-DD)
        #[arg(long)]
        generate: Option<NaiveDate>,

        /// Check or uncheck an item
        #[arg(long)]
        toggle: Option<i64>,

        /// Remove checked items
        #[arg(long = "clear-checked")]
        clear_checked: bool,

        /// Show which recipes an item comes from
        #[arg(long)]
        breakdown: Option<i64>,
    },
    /// List saved meals
    Meals,
    /// Parse a quantity such as "1 1/2" and print it normalized
    ParseQuantity {
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::ParseQuantity { text } = &cli.command {
        init_logging(&LoggingConfig::default())?;
        let locale = std::env::var("MEAL_PLANNER_LOCALE").ok();
        let localization = LocalizationManager::new(detect_language(locale.as_deref()))?;
        match parse_quantity(text) {
            Some(value) => println!("{} ({value})", format_quantity(value)),
            None => println!("{}", localization.t_args("cli-quantity-invalid", &[("text", text.as_str())])),
        }
        return Ok(());
    }

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    let localization = LocalizationManager::new(&config.locale)?;
    let client = ApiClient::new(&config.api).context("Failed to create API client")?;

    info!("Using backend at {}", client.base_url());

    let result = match cli.command {
        Commands::Recipes {
            search,
            category,
            meal_type,
            diet,
            favorites,
            max_time,
            new_days,
            quick,
            sort,
        } => {
            let mut state = FilterState::default();
            if let Some(term) = &search {
                state.set_search_term(term);
            }
            for value in &category {
                state.toggle_category(value);
            }
            for value in &meal_type {
                state.toggle_meal_type(value);
            }
            for value in &diet {
                state.toggle_dietary_preference(value);
            }
            state.set_favorites_only(favorites);
            state.set_max_cook_time(max_time);
            state.set_new_days(new_days);

            let engine = FilterEngine::new(config.quick_filters.clone());
            for id in &quick {
                state = engine.toggle_quick_filter(&state, id);
            }

            // A single category can be narrowed on the server as well
            let server_category = match category.as_slice() {
                [only] => Some(only.as_str()),
                _ => None,
            };
            list_recipes(&client, &engine, &state, server_category, sort, &localization).await
        }
        Commands::Shopping {
            generate,
            toggle,
            clear_checked,
            breakdown,
        } => {
            show_shopping(&client, generate, toggle, clear_checked, breakdown, &localization).await
        }
        Commands::Meals => list_meals(&client, &localization).await,
        Commands::ParseQuantity { .. } => Ok(()),
    };

    if let Err(err) = result {
        eprintln!("{}", err.user_message(&localization));
        return Err(err).context("Request to the backend failed");
    }
    Ok(())
}

async fn list_recipes(
    client: &ApiClient,
    engine: &FilterEngine,
    state: &FilterState,
    server_category: Option<&str>,
    sort: SortOrder,
    localization: &LocalizationManager,
) -> Result<(), meal_planner::api_errors::ApiError> {
    let recipes = client.list_recipes(server_category).await?;
    let mut shown = engine.apply(&recipes, state, Utc::now());
    sort_recipes(&mut shown, sort);

    let active: Vec<String> = engine
        .definitions()
        .iter()
        .filter(|d| engine.is_active(state, &d.id))
        .map(|d| localization.t(&d.label_key))
        .collect();
    if !active.is_empty() {
        println!("[{}]", active.join("] ["));
    }

    if shown.is_empty() {
        println!("{}", localization.t("cli-no-recipes"));
        return Ok(());
    }

    let shown_count = shown.len().to_string();
    let total = recipes.len().to_string();
    println!(
        "{}",
        localization.t_args("cli-recipes-header", &[("shown", shown_count.as_str()), ("total", total.as_str())])
    );
    for recipe in shown {
        println!("  {recipe}");
    }
    Ok(())
}

async fn show_shopping(
    client: &ApiClient,
    generate: Option<NaiveDate>,
    toggle: Option<i64>,
    clear_checked: bool,
    breakdown: Option<i64>,
    localization: &LocalizationManager,
) -> Result<(), meal_planner::api_errors::ApiError> {
    if let Some(id) = breakdown {
        let entries = client.get_breakdown(id).await?;
        println!("{}", localization.t_args("cli-breakdown-header", &[("item", id.to_string().as_str())]));
        println!("{}", breakdown_tooltip(&entries));
        return Ok(());
    }

    let mut list = match generate {
        Some(start) => ShoppingListState::new(client.generate_from_planner(start).await?),
        None => {
            let mut list = ShoppingListState::default();
            list.refresh(client).await?;
            list
        }
    };

    if let Some(id) = toggle {
        let name = list.item(id).map(|item| item.name.clone()).unwrap_or_else(|| id.to_string());
        if let Err(err) = list.toggle_checked(client, id).await {
            eprintln!("{}", localization.t_args("shopping-toggle-failed", &[("item", name.as_str())]));
            return Err(err);
        }
    }
    if clear_checked {
        let removed = list.clear_checked(client).await?;
        info!("Removed {removed} checked items");
    }

    let count = list.items().len().to_string();
    println!("{}", localization.t_args("cli-shopping-header", &[("count", count.as_str())]));
    let other = localization.t("shopping-uncategorized");
    for group in group_by_category(list.items(), &other) {
        println!("{}", group.name);
        for item in group.items {
            let mark = if item.checked { "x" } else { " " };
            let flag = if item.flagged { " !" } else { "" };
            let amount = item.display_quantity();
            if amount.is_empty() {
                println!("  [{mark}] {}{flag}  (#{})", item.name, item.id);
            } else {
                println!("  [{mark}] {} - {amount}{flag}  (#{})", item.name, item.id);
            }
        }
    }
    Ok(())
}

async fn list_meals(client: &ApiClient, localization: &LocalizationManager) -> Result<(), meal_planner::api_errors::ApiError> {
    let meals = client.list_meals().await?;
    let recipes = client.list_recipes(None).await?;
    let recipe_name = |id: &meal_planner::recipe_model::RecipeId| {
        recipes
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    };

    println!("{}", localization.t("cli-meals-header"));
    for meal in meals {
        let sides: Vec<String> = meal.side_recipe_ids.iter().map(recipe_name).collect();
        if sides.is_empty() {
            println!("  {}: {}", meal.name, recipe_name(&meal.main_recipe_id));
        } else {
            println!("  {}: {} + {}", meal.name, recipe_name(&meal.main_recipe_id), sides.join(", "));
        }
    }
    Ok(())
}
