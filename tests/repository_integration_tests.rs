use restaurant_api::{
    models::{
        Category, CreateRestaurantRequest, Location, MealCategory, NewUser, Restaurant, Role, User,
        UpdateRestaurantRequest,
    },
    pagination::PageRequest,
    repository::{
        NewMeal, NewRestaurant, PostgresRepository, RepoError, Repository, RestaurantChanges,
    },
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

/// Holds the pool of the database under test.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    /// Connects and migrates, or returns `None` when no database is configured so
    /// the suite stays green on machines without Postgres.
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();

        let Ok(db_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres repository tests");
            return None;
        };

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        Some(DbTestContext { pool })
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Marker unique to one test run, so rows from other runs never match a query.
fn marker() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn create_test_user(repo: &PostgresRepository) -> User {
    repo.create_user(NewUser {
        email: format!("{}@test.com", marker()),
        name: "Tester".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role: Role::User,
    })
    .await
    .expect("Failed to create test user")
}

fn location(address: &str) -> Location {
    Location {
        kind: "Point".to_string(),
        coordinates: vec![-77.4, 38.4],
        formatted_address: address.to_string(),
        city: "Stafford".to_string(),
        state: "VA".to_string(),
        zipcode: "22554".to_string(),
        country: "US".to_string(),
    }
}

async fn create_test_restaurant(repo: &PostgresRepository, owner: &User, name: &str) -> Restaurant {
    repo.create_restaurant(NewRestaurant {
        user_id: owner.id,
        details: CreateRestaurantRequest {
            name: name.to_string(),
            description: "Family run".to_string(),
            email: "owner@example.com".to_string(),
            phone_no: 5_405_551_234,
            address: "1 Main St, Stafford, VA".to_string(),
            category: Category::Cafe,
        },
        location: Some(location("1 Main St, Stafford, VA")),
    })
    .await
    .expect("Failed to create test restaurant")
}

fn new_meal(restaurant_id: Uuid, owner: &User) -> NewMeal {
    NewMeal {
        restaurant_id,
        user_id: owner.id,
        name: "Tomato Soup".to_string(),
        description: "Hot".to_string(),
        price: 6.5,
        category: MealCategory::Soups,
    }
}

// --- Credential Store ---

#[tokio::test]
async fn test_duplicate_email_differing_in_case_is_conflict() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let user = create_test_user(&repo).await;

    let result = repo
        .create_user(NewUser {
            email: user.email.to_uppercase(),
            name: "Again".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: Role::User,
        })
        .await;

    assert!(matches!(result, Err(RepoError::Conflict(msg)) if msg == "Duplicate email entered."));

    let found = repo
        .find_credentials_by_email(&user.email.to_uppercase())
        .await
        .unwrap()
        .expect("lookup ignores case");
    assert_eq!(found.user.id, user.id);
}

// --- Restaurants ---

#[tokio::test]
async fn test_keyword_search_is_case_insensitive_and_paged() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;
    let tag = marker();

    for prefix in ["Alpha", "beta", "GAMMA"] {
        create_test_restaurant(&repo, &owner, &format!("{prefix} {tag}")).await;
    }

    let first = repo
        .list_restaurants(Some(&tag.to_uppercase()), PageRequest::new(1, 2))
        .await
        .unwrap();
    let second = repo
        .list_restaurants(Some(&tag), PageRequest::new(2, 2))
        .await
        .unwrap();

    let names: Vec<_> = first.iter().chain(&second).map(|r| r.name.clone()).collect();
    assert_eq!(
        names,
        vec![format!("Alpha {tag}"), format!("beta {tag}"), format!("GAMMA {tag}")]
    );
}

#[tokio::test]
async fn test_keyword_wildcards_match_literally() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;
    let tag = marker();

    create_test_restaurant(&repo, &owner, &format!("{tag} 100% Vegan")).await;
    create_test_restaurant(&repo, &owner, &format!("{tag} 1000 Vegan")).await;

    let found = repo
        .list_restaurants(Some(&format!("{tag} 100%")), PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, format!("{tag} 100% Vegan"));

    let underscore = repo
        .list_restaurants(Some(&format!("{tag} 1_00")), PageRequest::new(1, 10))
        .await
        .unwrap();
    assert!(underscore.is_empty());
}

#[tokio::test]
async fn test_partial_update_keeps_unset_columns_and_owner() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;
    let restaurant = create_test_restaurant(&repo, &owner, "Before").await;

    let updated = repo
        .update_restaurant(
            restaurant.id,
            RestaurantChanges {
                details: UpdateRestaurantRequest {
                    name: Some("After".to_string()),
                    category: Some(Category::FineDining),
                    ..Default::default()
                },
                location: None,
            },
        )
        .await
        .unwrap()
        .expect("restaurant exists");

    assert_eq!(updated.name, "After");
    assert_eq!(updated.category, Category::FineDining);
    assert_eq!(updated.description, restaurant.description);
    assert_eq!(updated.phone_no, restaurant.phone_no);
    assert_eq!(updated.user, owner.id);
    assert_eq!(updated.location, restaurant.location);
}

#[tokio::test]
async fn test_relocation_replaces_or_clears_location() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;
    let restaurant = create_test_restaurant(&repo, &owner, "Mover").await;

    let moved = repo
        .update_restaurant(
            restaurant.id,
            RestaurantChanges {
                details: UpdateRestaurantRequest {
                    address: Some("2 Side St".to_string()),
                    ..Default::default()
                },
                location: Some(Some(location("2 Side St"))),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.location, Some(location("2 Side St")));

    let lost = repo
        .update_restaurant(
            restaurant.id,
            RestaurantChanges {
                details: UpdateRestaurantRequest {
                    address: Some("Nowhere Lane 0".to_string()),
                    ..Default::default()
                },
                location: Some(None),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lost.address, "Nowhere Lane 0");
    assert!(lost.location.is_none());
}

#[tokio::test]
async fn test_update_of_missing_restaurant_is_none() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();

    let result = repo
        .update_restaurant(Uuid::new_v4(), RestaurantChanges::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

// --- Menu and Meals ---

#[tokio::test]
async fn test_menu_push_and_pull_are_single_row_updates() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;
    let restaurant = create_test_restaurant(&repo, &owner, "Menu House").await;

    let soup = repo.create_meal(new_meal(restaurant.id, &owner)).await.unwrap();
    let salad = repo.create_meal(new_meal(restaurant.id, &owner)).await.unwrap();
    assert!(repo.push_menu_item(restaurant.id, soup.id).await.unwrap());
    assert!(repo.push_menu_item(restaurant.id, salad.id).await.unwrap());

    let menu = repo.get_restaurant(restaurant.id).await.unwrap().unwrap().menu;
    assert_eq!(menu, vec![soup.id, salad.id]);

    assert!(repo.pull_menu_item(restaurant.id, soup.id).await.unwrap());
    let menu = repo.get_restaurant(restaurant.id).await.unwrap().unwrap().menu;
    assert_eq!(menu, vec![salad.id]);

    assert!(!repo.push_menu_item(Uuid::new_v4(), soup.id).await.unwrap());
}

#[tokio::test]
async fn test_meal_for_missing_restaurant_is_not_found() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;

    let result = repo.create_meal(new_meal(Uuid::new_v4(), &owner)).await;

    assert!(matches!(result, Err(RepoError::NotFound(msg)) if msg == "Restaurant not found with this Id."));
}

#[tokio::test]
async fn test_deleting_restaurant_cascades_to_meals() {
    let Some(ctx) = DbTestContext::setup().await else { return };
    let repo = ctx.repository();
    let owner = create_test_user(&repo).await;
    let restaurant = create_test_restaurant(&repo, &owner, "Closing Down").await;
    let meal = repo.create_meal(new_meal(restaurant.id, &owner)).await.unwrap();

    assert!(repo.delete_restaurant(restaurant.id).await.unwrap());

    assert!(repo.get_meal(meal.id).await.unwrap().is_none());
    assert!(repo.list_meals_by_restaurant(restaurant.id).await.unwrap().is_empty());
    assert!(!repo.delete_restaurant(restaurant.id).await.unwrap());
}
