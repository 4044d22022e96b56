//! Behaviour tests for session-gated household state.
//!
//! Scenarios drive the composed application against the in-memory backend
//! with file-backed credential storage and background session subscriptions.

use std::cell::{Cell, RefCell};
use std::fs;
use std::sync::Arc;

use household_client::HouseholdApp;
use household_client::domain::ports::{AuthGateway, CredentialStore};
use household_client::domain::{
    LoginCredentials, ResourceId, SessionPhase, Transaction, TransactionDate,
};
use household_client::outbound::storage::{FileCredentialStore, SESSION_FILE_NAME};
use household_client::test_support::{BackendOperation, InMemoryBackend, temp_credential_store};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

type App = HouseholdApp<InMemoryBackend, InMemoryBackend, InMemoryBackend, FileCredentialStore>;

const PASSWORD: &str = "correct horse";
const GROCERY_ID: i64 = 900;

struct World {
    runtime: Runtime,
    backend: Arc<InMemoryBackend>,
    storage: Arc<FileCredentialStore>,
    _storage_dir: TempDir,
    app: RefCell<Option<App>>,
    subscriptions: RefCell<Vec<JoinHandle<()>>>,
    logins_before_start: Cell<usize>,
}

impl World {
    fn new() -> Self {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let (storage_dir, storage) = temp_credential_store().expect("temporary storage");
        Self {
            runtime,
            backend: Arc::new(InMemoryBackend::default()),
            storage: Arc::new(storage),
            _storage_dir: storage_dir,
            app: RefCell::new(None),
            subscriptions: RefCell::new(Vec::new()),
            logins_before_start: Cell::new(0),
        }
    }

    fn start(&self) {
        self.logins_before_start
            .set(self.backend.call_count(BackendOperation::Login));
        let app = HouseholdApp::with_ports(
            Arc::clone(&self.backend),
            Arc::clone(&self.backend),
            Arc::clone(&self.backend),
            Arc::clone(&self.storage),
        );
        let handles = self.runtime.block_on(async { app.start() });
        self.subscriptions.borrow_mut().extend(handles);
        *self.app.borrow_mut() = Some(app);
        self.settle();
    }

    /// Let background subscriptions react to the latest session change.
    fn settle(&self) {
        self.runtime.block_on(async {
            for _ in 0..64 {
                tokio::task::yield_now().await;
            }
        });
    }

    fn with_app<R>(&self, f: impl FnOnce(&App) -> R) -> R {
        let app = self.app.borrow();
        f(app.as_ref().expect("client should be started"))
    }

    fn login(&self, username: &str) {
        self.with_app(|app| {
            self.runtime
                .block_on(app.session().login(username, PASSWORD))
                .expect("login should succeed");
        });
        self.settle();
    }

    fn session_file_exists(&self) -> bool {
        self.storage.directory().join(SESSION_FILE_NAME).exists()
    }
}

fn grocery_transaction() -> Transaction {
    Transaction {
        id: ResourceId::Number(GROCERY_ID),
        date: TransactionDate::new("2023-10-20T00:00:00"),
        description: "ICA NARA".to_owned(),
        category: "Groceries".to_owned(),
        amount: -212.0,
    }
}

#[fixture]
fn world() -> World {
    World::new()
}

#[given("a backend where ada owns two rooms and a grocery transaction")]
fn ada_owns_a_household(world: &World) {
    world.backend.add_user("ada", PASSWORD);
    let kitchen = world.backend.seed_room("ada", "Kitchen", "1");
    let _study = world.backend.seed_room("ada", "Study", "2");
    let _color = world
        .backend
        .seed_color("ada", "S 0502-Y", "Chalk", &kitchen.id);
    world
        .backend
        .seed_transactions("ada", vec![grocery_transaction()]);
}

#[given("bob owns a single garage")]
fn bob_owns_a_garage(world: &World) {
    world.backend.add_user("bob", PASSWORD);
    let _garage = world.backend.seed_room("bob", "Garage", "0");
}

#[given("the client has started without a stored session")]
fn client_started_anonymous(world: &World) {
    world.start();
    world.with_app(|app| {
        assert_eq!(app.session().snapshot().phase(), &SessionPhase::Anonymous);
    });
}

#[given("ada is logged in with the household loaded")]
fn ada_is_logged_in(world: &World) {
    world.login("ada");
    world.with_app(|app| {
        assert_eq!(app.resources().rooms().len(), 2);
        assert_eq!(app.ledger().transactions().len(), 1);
    });
}

#[given("room listings are held by the backend")]
fn room_listings_are_held(world: &World) {
    world.backend.hold(BackendOperation::ListRooms);
}

#[given("transaction updates fail on the backend")]
fn transaction_updates_fail(world: &World) {
    world.backend.fail(BackendOperation::UpdateTransaction);
}

#[given("a session for ada was stored by a previous run")]
fn session_was_stored(world: &World) {
    let credentials = LoginCredentials::try_from_parts("ada", PASSWORD).expect("credentials");
    let identity = world
        .runtime
        .block_on(world.backend.login(&credentials))
        .expect("backend login");
    world.storage.save(&identity).expect("save session");
}

#[given("the stored session file is corrupt")]
fn stored_session_is_corrupt(world: &World) {
    fs::create_dir_all(world.storage.directory()).expect("storage directory");
    fs::write(
        world.storage.directory().join(SESSION_FILE_NAME),
        "{ not json",
    )
    .expect("write corrupt session");
}

#[when("the client starts")]
fn the_client_starts(world: &World) {
    world.start();
}

#[when("ada logs in")]
fn ada_logs_in(world: &World) {
    world.login("ada");
}

#[when("the user logs out")]
fn the_user_logs_out(world: &World) {
    world.with_app(|app| app.session().logout());
}

#[when("a room refresh is in flight as the user logs out")]
fn refresh_in_flight_during_logout(world: &World) {
    let backend = Arc::clone(&world.backend);
    world.with_app(|app| {
        world.runtime.block_on(async {
            tokio::join!(app.resources().fetch_rooms(), async {
                backend.wait_for_pending(1).await;
                app.session().logout();
                backend.release();
            });
        });
    });
    world.settle();
}

#[when("ada logs in and adds the category Pets before the stores reload")]
fn ada_adds_category_right_after_login(world: &World) {
    world.with_app(|app| {
        let added = world.runtime.block_on(async {
            app.session()
                .login("ada", PASSWORD)
                .await
                .expect("login should succeed");
            app.ledger().add_category("Pets")
        });
        assert!(added, "Pets should be new to the default list");
    });
    world.settle();
}

#[when("the user logs out and bob logs in")]
fn switch_to_bob(world: &World) {
    world.with_app(|app| app.session().logout());
    world.settle();
    world.login("bob");
}

#[when("ada moves the grocery transaction to Entertainment")]
fn ada_recategorises(world: &World) {
    world.with_app(|app| {
        world.runtime.block_on(
            app.ledger()
                .update_category(&ResourceId::Number(GROCERY_ID), "Entertainment"),
        );
    });
}

#[then("the store lists ada's rooms")]
fn store_lists_ada_rooms(world: &World) {
    world.with_app(|app| {
        let names: Vec<String> = app
            .resources()
            .rooms()
            .into_iter()
            .map(|room| room.name)
            .collect();
        assert_eq!(names, vec!["Kitchen".to_owned(), "Study".to_owned()]);
    });
}

#[then("the ledger lists ada's grocery transaction")]
fn ledger_lists_grocery(world: &World) {
    world.with_app(|app| {
        assert_eq!(app.ledger().transactions(), vec![grocery_transaction()]);
    });
}

#[then("the session is persisted on disk")]
fn session_is_persisted(world: &World) {
    let stored = world.storage.load().expect("load").expect("stored identity");
    assert_eq!(stored.username(), "ada");
}

#[then("rooms, colors, and transactions are empty immediately")]
fn collections_are_empty(world: &World) {
    world.with_app(|app| {
        assert!(app.resources().rooms().is_empty());
        assert!(app.resources().colors().is_empty());
        assert!(app.ledger().transactions().is_empty());
    });
}

#[then("the persisted session is removed")]
fn persisted_session_removed(world: &World) {
    assert!(!world.session_file_exists());
}

#[then("the held listing was answered by the backend")]
fn held_listing_answered(world: &World) {
    assert_eq!(world.backend.pending(), 0);
    assert!(world.backend.call_count(BackendOperation::ListRooms) >= 2);
}

#[then("the store lists only bob's garage")]
fn store_lists_bob_garage(world: &World) {
    world.with_app(|app| {
        let rooms = app.resources().rooms();
        assert_eq!(rooms.len(), 1);
        assert!(rooms.iter().all(|room| room.name == "Garage"));
        assert!(app.resources().colors().is_empty());
        assert!(app.ledger().transactions().is_empty());
    });
}

#[then("the grocery transaction is still categorised as Groceries")]
fn grocery_rolled_back(world: &World) {
    world.with_app(|app| {
        assert_eq!(app.ledger().transactions(), vec![grocery_transaction()]);
    });
    assert_eq!(
        world.backend.transactions_of("ada"),
        vec![grocery_transaction()]
    );
}

#[then("the categories include Pets")]
fn categories_include_pets(world: &World) {
    world.with_app(|app| {
        assert!(app.ledger().categories().contains(&"Pets".to_owned()));
    });
}

#[then("the session is authenticated as ada")]
fn authenticated_as_ada(world: &World) {
    world.with_app(|app| {
        assert_eq!(app.session().username().as_deref(), Some("ada"));
    });
}

#[then("the backend received no further login")]
fn no_further_login(world: &World) {
    assert_eq!(
        world.backend.call_count(BackendOperation::Login),
        world.logins_before_start.get()
    );
}

#[then("the session is anonymous")]
fn session_is_anonymous(world: &World) {
    world.with_app(|app| {
        assert_eq!(app.session().snapshot().phase(), &SessionPhase::Anonymous);
    });
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "Logging in loads the household"
)]
fn logging_in_loads_the_household(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "Logging out clears every collection at once"
)]
fn logging_out_clears_every_collection(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A room listing that completes after logout is discarded"
)]
fn late_room_listing_is_discarded(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "Switching users never shows the previous user's rooms"
)]
fn switching_users_isolates_rooms(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A rejected category change is rolled back"
)]
fn rejected_category_change_rolls_back(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A stored session is restored without logging in again"
)]
fn stored_session_is_restored(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "An unreadable stored session starts anonymous"
)]
fn unreadable_session_starts_anonymous(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A category added right after login survives the session reload"
)]
fn category_added_after_login_survives(world: World) {
    drop(world);
}
