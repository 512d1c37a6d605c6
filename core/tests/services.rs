//! Service-level tests over the in-memory environment.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use trailbound_core::booking_gate::BookingGate;
use trailbound_core::domain::{
    Difficulty, NewReview, NewTour, ReviewUpdate, Role, Signup, TourUpdate, User,
};
use trailbound_core::providers::UserRepository;
use trailbound_core::query::QueryPlan;
use trailbound_core::ratings::AggregateMaintainer;
use trailbound_core::services::{BookingService, ReviewService, TourService, UserService};
use trailbound_core::{Actor, Environment, Error};
use trailbound_testing::{SentMail, TestWorld};

struct App {
    world: TestWorld,
    tours: TourService,
    reviews: ReviewService,
    bookings: BookingService,
    users: UserService,
}

fn app() -> App {
    let world = TestWorld::new();
    App::from_world(world)
}

impl App {
    fn from_world(world: TestWorld) -> Self {
        let env: Environment = world.env.clone();
        let gate = Arc::new(BookingGate::new(env.bookings.clone()));
        let ratings = Arc::new(AggregateMaintainer::new(
            env.tours.clone(),
            env.reviews.clone(),
        ));
        Self {
            tours: TourService::new(env.clone()),
            reviews: ReviewService::new(env.clone(), gate.clone(), ratings),
            bookings: BookingService::new(env.clone(), gate),
            users: UserService::new(env),
            world,
        }
    }

    async fn seed_user(&self, role: Role) -> Actor {
        let mut user = User::new(
            format!("{} person", role.as_str()),
            format!("{}-{}@example.com", role.as_str(), uuid::Uuid::new_v4()),
            String::new(),
        );
        user.role = role;
        UserRepository::create(&*self.world.users, &user).await.unwrap();
        Actor::new(user.id, role)
    }

    async fn seed_tour(&self, admin: &Actor, name: &str) -> trailbound_core::domain::Tour {
        self.tours
            .create(
                admin,
                NewTour {
                    name: name.to_string(),
                    duration: 5,
                    max_group_size: 10,
                    difficulty: Difficulty::Medium,
                    price: 99_900,
                    price_discount: None,
                    summary: "A lovely long walk in the mountains".to_string(),
                    description: None,
                    start_dates: Vec::new(),
                    guides: Vec::new(),
                    secret: false,
                },
            )
            .await
            .unwrap()
    }

    async fn book(&self, actor: &Actor, tour: trailbound_core::domain::TourId) {
        let admin = self.seed_user(Role::Admin).await;
        self.bookings
            .create(
                &admin,
                trailbound_core::domain::NewBooking {
                    tour_id: tour,
                    user_id: actor.user_id,
                    price: 99_900,
                },
            )
            .await
            .unwrap();
    }
}

fn review_text() -> String {
    "Absolutely stunning views the whole way".to_string()
}

#[tokio::test]
async fn review_lifecycle_keeps_aggregate_consistent() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let customer = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Mountain Rambler").await;

    // Fresh tour shows the schema defaults.
    assert_eq!(tour.ratings_quantity, 0);
    assert!((tour.ratings_average - 4.5).abs() < f64::EPSILON);

    app.book(&customer, tour.id).await;
    let review = app
        .reviews
        .create(
            &customer,
            tour.id,
            NewReview {
                text: review_text(),
                rating: 5,
            },
        )
        .await
        .unwrap();

    let tour_after = app.tours.get(tour.id).await.unwrap();
    assert_eq!(tour_after.ratings_quantity, 1);
    assert!((tour_after.ratings_average - 5.0).abs() < f64::EPSILON);

    app.reviews
        .update(
            &customer,
            review.id,
            ReviewUpdate {
                rating: Some(3),
                text: None,
            },
        )
        .await
        .unwrap();
    let tour_after = app.tours.get(tour.id).await.unwrap();
    assert!((tour_after.ratings_average - 3.0).abs() < f64::EPSILON);

    // Deleting the last review resets to the defaults.
    app.reviews.delete(&customer, review.id).await.unwrap();
    let tour_after = app.tours.get(tour.id).await.unwrap();
    assert_eq!(tour_after.ratings_quantity, 0);
    assert!((tour_after.ratings_average - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn concurrent_duplicate_reviews_yield_one_conflict() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let customer = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Forest Wanderer").await;
    app.book(&customer, tour.id).await;

    let input = || NewReview {
        text: review_text(),
        rating: 4,
    };
    let (a, b) = tokio::join!(
        app.reviews.create(&customer, tour.id, input()),
        app.reviews.create(&customer, tour.id, input()),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(Error::Conflict(_)))));

    let tour_after = app.tours.get(tour.id).await.unwrap();
    assert_eq!(tour_after.ratings_quantity, 1);
}

#[tokio::test]
async fn reviews_require_a_booking_and_customer_role() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let customer = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Coastal Drifter").await;

    let input = NewReview {
        text: review_text(),
        rating: 4,
    };
    // No booking yet.
    assert!(matches!(
        app.reviews.create(&customer, tour.id, input.clone()).await,
        Err(Error::Forbidden(_))
    ));
    // Admins never review, booked or not.
    assert!(matches!(
        app.reviews.create(&admin, tour.id, input).await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn review_updates_are_owner_or_admin_only() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let author = app.seed_user(Role::User).await;
    let stranger = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Desert Crossing").await;
    app.book(&author, tour.id).await;

    let review = app
        .reviews
        .create(
            &author,
            tour.id,
            NewReview {
                text: review_text(),
                rating: 2,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        app.reviews.delete(&stranger, review.id).await,
        Err(Error::Forbidden(_))
    ));
    assert!(app.reviews.delete(&admin, review.id).await.is_ok());
}

#[tokio::test]
async fn tour_delete_cascades_and_listing_hides_secret_tours() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let customer = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Hidden Valley Trek").await;
    app.book(&customer, tour.id).await;
    app.reviews
        .create(
            &customer,
            tour.id,
            NewReview {
                text: review_text(),
                rating: 5,
            },
        )
        .await
        .unwrap();

    // Secret tours drop out of listings but stay reachable by id.
    app.tours
        .update(
            &admin,
            tour.id,
            TourUpdate {
                secret: Some(true),
                ..TourUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(app.tours.list(QueryPlan::default()).await.unwrap().is_empty());
    assert!(app.tours.get(tour.id).await.is_ok());

    app.tours.delete(&admin, tour.id).await.unwrap();
    assert!(matches!(
        app.tours.get(tour.id).await,
        Err(Error::NotFound { .. })
    ));
    assert!(app
        .reviews
        .list(Some(tour.id), QueryPlan::default())
        .await
        .unwrap()
        .is_empty());
    assert!(!app.bookings.has_booked(&customer, tour.id).await.unwrap());
}

#[tokio::test]
async fn tour_mutations_are_role_gated_and_guides_validated() {
    let app = app();
    let customer = app.seed_user(Role::User).await;
    let admin = app.seed_user(Role::Admin).await;
    let guide = app.seed_user(Role::Guide).await;

    let input = NewTour {
        name: "The Northern Lights".to_string(),
        duration: 3,
        max_group_size: 8,
        difficulty: Difficulty::Easy,
        price: 50_000,
        price_discount: None,
        summary: "Chasing auroras across the fjords".to_string(),
        description: None,
        start_dates: Vec::new(),
        guides: vec![customer.user_id],
        secret: false,
    };

    assert!(matches!(
        app.tours.create(&customer, input.clone()).await,
        Err(Error::Forbidden(_))
    ));
    // A customer in the guide list is a validation error.
    assert!(matches!(
        app.tours.create(&admin, input.clone()).await,
        Err(Error::Validation(_))
    ));

    let input = NewTour {
        guides: vec![guide.user_id],
        ..input
    };
    assert!(app.tours.create(&admin, input).await.is_ok());
}

#[tokio::test]
async fn checkout_and_webhook_create_one_booking() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let tour = app.seed_tour(&admin, "The Glacier Explorer").await;

    let customer = app
        .users
        .signup(Signup {
            name: "Lena".to_string(),
            email: "lena@example.com".to_string(),
            password: "correcthorse".to_string(),
            password_confirm: "correcthorse".to_string(),
        })
        .await
        .unwrap();
    let actor = Actor::new(customer.id, Role::User);

    let session = app
        .bookings
        .checkout_session(&actor, tour.id, "https://app.test/ok", "https://app.test/no")
        .await
        .unwrap();
    assert!(session.id.starts_with("mock_cs_"));

    let payload = serde_json::json!({
        "type": "checkout.completed",
        "tourId": tour.id,
        "payerEmail": "lena@example.com",
        "amountCents": 99_900,
    })
    .to_string();

    app.bookings
        .handle_payment_event(payload.as_bytes(), Some("mock"))
        .await
        .unwrap();
    // Redelivery hits the unique pair and is acknowledged, not failed.
    app.bookings
        .handle_payment_event(payload.as_bytes(), Some("mock"))
        .await
        .unwrap();

    let mine = app.bookings.my_bookings(&actor).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].price, 99_900);

    // A booked tour cannot be checked out again.
    assert!(matches!(
        app.bookings
            .checkout_session(&actor, tour.id, "https://app.test/ok", "https://app.test/no")
            .await,
        Err(Error::Conflict(_))
    ));

    // Confirmation mail is spawned; give it a beat.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let sent = app.world.notifier.sent();
    assert!(sent.contains(&SentMail::BookingConfirmation(
        "lena@example.com".to_string(),
        "The Glacier Explorer".to_string(),
    )));
}

#[tokio::test]
async fn checkout_without_gateway_is_upstream() {
    let app = App::from_world(TestWorld::without_payments());
    let admin = app.seed_user(Role::Admin).await;
    let customer = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Quiet Highlands").await;

    assert!(matches!(
        app.bookings
            .checkout_session(&customer, tour.id, "https://a", "https://b")
            .await,
        Err(Error::Upstream(_))
    ));
}

#[tokio::test]
async fn password_reset_round_trip() {
    let app = app();
    let user = app
        .users
        .signup(Signup {
            name: "Mara".to_string(),
            email: "mara@example.com".to_string(),
            password: "firstpassword".to_string(),
            password_confirm: "firstpassword".to_string(),
        })
        .await
        .unwrap();

    app.users
        .forgot_password("mara@example.com", "https://app.test/reset")
        .await
        .unwrap();

    let token = app
        .world
        .notifier
        .sent()
        .into_iter()
        .find_map(|mail| match mail {
            SentMail::PasswordReset(_, url) => {
                url.rsplit('/').next().map(ToString::to_string)
            }
            _ => None,
        })
        .unwrap();

    let reset = app
        .users
        .reset_password(&token, "secondpassword", "secondpassword")
        .await
        .unwrap();
    assert_eq!(reset.id, user.id);
    assert!(reset.password_changed_at.is_some());

    // Old password out, new password in.
    assert!(matches!(
        app.users.login("mara@example.com", "firstpassword").await,
        Err(Error::Unauthenticated(_))
    ));
    assert!(app
        .users
        .login("mara@example.com", "secondpassword")
        .await
        .is_ok());

    // The token is single-use.
    assert!(matches!(
        app.users
            .reset_password(&token, "thirdpassword", "thirdpassword")
            .await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn failed_reset_mail_clears_the_token() {
    let app = app();
    app.users
        .signup(Signup {
            name: "Noor".to_string(),
            email: "noor@example.com".to_string(),
            password: "strongenough".to_string(),
            password_confirm: "strongenough".to_string(),
        })
        .await
        .unwrap();

    app.world.notifier.fail(true);
    assert!(matches!(
        app.users
            .forgot_password("noor@example.com", "https://app.test/reset")
            .await,
        Err(Error::Upstream(_))
    ));
    app.world.notifier.fail(false);

    let stored = app
        .world
        .users
        .find_active_by_email("noor@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password_reset_digest.is_none());
    assert!(stored.password_reset_expires.is_none());
}

#[tokio::test]
async fn soft_deleted_accounts_stop_resolving() {
    let app = app();
    let user = app
        .users
        .signup(Signup {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password: "goodpassword".to_string(),
            password_confirm: "goodpassword".to_string(),
        })
        .await
        .unwrap();
    let actor = Actor::new(user.id, Role::User);

    app.users.delete_me(&actor).await.unwrap();

    assert!(matches!(
        app.users.login("sam@example.com", "goodpassword").await,
        Err(Error::Unauthenticated(_))
    ));
    let admin = app.seed_user(Role::Admin).await;
    let listed = app.users.list(&admin, QueryPlan::default()).await.unwrap();
    assert!(listed.iter().all(|u| u.id != user.id));
}

#[tokio::test]
async fn signup_sends_welcome_and_rejects_duplicate_email() {
    let app = app();
    let signup = Signup {
        name: "Iris".to_string(),
        email: "Iris@Example.com".to_string(),
        password: "goodpassword".to_string(),
        password_confirm: "goodpassword".to_string(),
    };
    let user = app.users.signup(signup.clone()).await.unwrap();
    assert_eq!(user.email, "iris@example.com");

    assert!(matches!(
        app.users.signup(signup).await,
        Err(Error::Conflict(_))
    ));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app
        .world
        .notifier
        .sent()
        .contains(&SentMail::Welcome("iris@example.com".to_string())));
}

#[tokio::test]
async fn update_password_verifies_the_current_one() {
    let app = app();
    let user = app
        .users
        .signup(Signup {
            name: "Ove".to_string(),
            email: "ove@example.com".to_string(),
            password: "originalpass".to_string(),
            password_confirm: "originalpass".to_string(),
        })
        .await
        .unwrap();
    let actor = Actor::new(user.id, Role::User);

    assert!(matches!(
        app.users
            .update_password(&actor, "wrongpass", "replacement1", "replacement1")
            .await,
        Err(Error::Unauthenticated(_))
    ));
    assert!(app
        .users
        .update_password(&actor, "originalpass", "replacement1", "replacement1")
        .await
        .is_ok());
    assert!(app
        .users
        .login("ove@example.com", "replacement1")
        .await
        .is_ok());
}

#[tokio::test]
async fn recompute_settles_to_a_fixed_point() {
    let app = app();
    let admin = app.seed_user(Role::Admin).await;
    let customer = app.seed_user(Role::User).await;
    let tour = app.seed_tour(&admin, "The Coastal Drifter").await;

    app.book(&customer, tour.id).await;
    app.reviews
        .create(
            &customer,
            tour.id,
            NewReview {
                text: review_text(),
                rating: 4,
            },
        )
        .await
        .unwrap();

    let maintainer = AggregateMaintainer::new(
        app.world.env.tours.clone(),
        app.world.env.reviews.clone(),
    );

    maintainer.recompute(tour.id).await.unwrap();
    let first = app.tours.get(tour.id).await.unwrap();

    // A second pass with no review changes must not move the aggregate.
    maintainer.recompute(tour.id).await.unwrap();
    let second = app.tours.get(tour.id).await.unwrap();

    assert_eq!(first.ratings_quantity, 1);
    assert_eq!(second.ratings_quantity, first.ratings_quantity);
    assert!((second.ratings_average - first.ratings_average).abs() < f64::EPSILON);
    assert!((first.ratings_average - 4.0).abs() < f64::EPSILON);
}
