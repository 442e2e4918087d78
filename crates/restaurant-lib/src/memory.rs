//! In-memory backends for local runs and tests.
//!
//! [`InMemoryStore`] implements every data-access trait over plain vectors,
//! and [`InMemoryIdentity`] stands in for the identity provider.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::identity::{AuthTokens, IdentityProvider, NewAccount};
use crate::model::{Dish, Feedback, Location, Reservation, Table, User};
use crate::store::{
    ContinuationKey, DishStore, FeedbackSlice, FeedbackStore, LocationStore, ReservationStore,
    TableStore, UserStore, WaiterStore,
};

const FEEDBACK_KEY: &str = "feedbackId";

#[derive(Debug, Default)]
struct Data {
    locations: Vec<Location>,
    tables: Vec<Table>,
    reservations: Vec<Reservation>,
    dishes: Vec<Dish>,
    popular: HashSet<String>,
    feedback: Vec<Feedback>,
    users: HashMap<String, User>,
    waiters: HashSet<String>,
}

/// Vector-backed store; feedback pages follow insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<Data>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(self, location: Location) -> Self {
        lock(&self.data).locations.push(location);
        self
    }

    pub fn with_table(self, table: Table) -> Self {
        lock(&self.data).tables.push(table);
        self
    }

    pub fn with_reservation(self, reservation: Reservation) -> Self {
        lock(&self.data).reservations.push(reservation);
        self
    }

    pub fn with_dish(self, dish: Dish, popular: bool) -> Self {
        {
            let mut data = lock(&self.data);
            if popular {
                data.popular.insert(dish.id.clone());
            }
            data.dishes.push(dish);
        }
        self
    }

    pub fn with_feedback(self, feedback: Feedback) -> Self {
        lock(&self.data).feedback.push(feedback);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        lock(&self.data)
            .users
            .insert(user.cognito_id.clone(), user);
        self
    }

    pub fn with_waiter(self, email: impl Into<String>) -> Self {
        lock(&self.data).waiters.insert(email.into());
        self
    }

    /// Snapshot of every stored reservation.
    pub fn reservations(&self) -> Vec<Reservation> {
        lock(&self.data).reservations.clone()
    }

    pub fn user(&self, cognito_id: &str) -> Option<User> {
        lock(&self.data).users.get(cognito_id).cloned()
    }
}

#[async_trait]
impl LocationStore for InMemoryStore {
    async fn list_locations(&self) -> Result<Vec<Location>> {
        Ok(lock(&self.data).locations.clone())
    }

    async fn get_location(&self, location_id: &str) -> Result<Option<Location>> {
        Ok(lock(&self.data)
            .locations
            .iter()
            .find(|l| l.id == location_id)
            .cloned())
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn tables_for_location(&self, location_id: &str) -> Result<Vec<Table>> {
        Ok(lock(&self.data)
            .tables
            .iter()
            .filter(|t| t.location_id == location_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn reservations_for_tables(
        &self,
        table_ids: &[String],
        date: Option<&str>,
    ) -> Result<Vec<Reservation>> {
        Ok(lock(&self.data)
            .reservations
            .iter()
            .filter(|r| table_ids.contains(&r.table_id))
            .filter(|r| date.map_or(true, |d| r.date == d))
            .cloned()
            .collect())
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<()> {
        let mut data = lock(&self.data);
        if data.reservations.iter().any(|r| r.id == reservation.id) {
            return Err(Error::ReservationConflict(format!(
                "Reservation {} already exists",
                reservation.id
            )));
        }
        data.reservations.push(reservation.clone());
        Ok(())
    }
}

#[async_trait]
impl DishStore for InMemoryStore {
    async fn dishes_by_ids(&self, dish_ids: &[String]) -> Result<Vec<Dish>> {
        Ok(lock(&self.data)
            .dishes
            .iter()
            .filter(|d| dish_ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn popular_dishes(&self) -> Result<Vec<Dish>> {
        let data = lock(&self.data);
        Ok(data
            .dishes
            .iter()
            .filter(|d| data.popular.contains(&d.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FeedbackStore for InMemoryStore {
    async fn count_feedback(&self, location_id: &str, feedback_type: &str) -> Result<u64> {
        Ok(lock(&self.data)
            .feedback
            .iter()
            .filter(|f| f.location_id == location_id && f.feedback_type == feedback_type)
            .count() as u64)
    }

    async fn feedback_page(
        &self,
        location_id: &str,
        feedback_type: &str,
        limit: usize,
        start: Option<&ContinuationKey>,
    ) -> Result<FeedbackSlice> {
        let data = lock(&self.data);
        let matching: Vec<&Feedback> = data
            .feedback
            .iter()
            .filter(|f| f.location_id == location_id && f.feedback_type == feedback_type)
            .collect();

        let offset = match start.and_then(|key| key.get(FEEDBACK_KEY)) {
            Some(last_id) => matching
                .iter()
                .position(|f| f.id == last_id)
                .map(|i| i + 1)
                .ok_or_else(|| Error::invalid_parameter("Invalid cursor"))?,
            None => 0,
        };

        let items: Vec<Feedback> = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|f| (*f).clone())
            .collect();

        // A full page always hands back a key, like a limited query does.
        let next = (limit > 0 && items.len() == limit)
            .then(|| items.last())
            .flatten()
            .map(|last| {
                ContinuationKey(BTreeMap::from([(
                    FEEDBACK_KEY.to_string(),
                    last.id.clone(),
                )]))
            });

        Ok(FeedbackSlice { items, next })
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, cognito_id: &str) -> Result<Option<User>> {
        Ok(lock(&self.data).users.get(cognito_id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        lock(&self.data)
            .users
            .insert(user.cognito_id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl WaiterStore for InMemoryStore {
    async fn is_waiter(&self, email: &str) -> Result<bool> {
        Ok(lock(&self.data).waiters.contains(email))
    }
}

#[derive(Debug, Clone)]
struct Account {
    subject: String,
    password: String,
    groups: Vec<String>,
}

/// Identity provider kept in memory.
///
/// Passwords shorter than `min_password_length` are rejected as weak.
#[derive(Debug)]
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    groups: Mutex<HashSet<String>>,
    min_password_length: usize,
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashSet::new()),
            min_password_length: 8,
        }
    }
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account with a permanent password.
    pub fn with_account(self, email: &str, subject: &str, password: &str, groups: &[&str]) -> Self {
        lock(&self.accounts).insert(
            email.to_string(),
            Account {
                subject: subject.to_string(),
                password: password.to_string(),
                groups: groups.iter().map(|g| g.to_string()).collect(),
            },
        );
        self
    }

    pub fn groups_of(&self, email: &str) -> Vec<String> {
        lock(&self.accounts)
            .get(email)
            .map(|a| a.groups.clone())
            .unwrap_or_default()
    }

    pub fn existing_groups(&self) -> HashSet<String> {
        lock(&self.groups).clone()
    }

    fn check_policy(&self, password: &str) -> Result<()> {
        if password.len() < self.min_password_length {
            return Err(Error::WeakPassword);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(lock(&self.accounts).contains_key(email))
    }

    async fn create_user(
        &self,
        account: &NewAccount,
        temporary_password: &str,
    ) -> Result<String> {
        self.check_policy(temporary_password)?;
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(&account.email) {
            return Err(Error::EmailAlreadyExists);
        }
        let subject = uuid::Uuid::new_v4().to_string();
        accounts.insert(
            account.email.clone(),
            Account {
                subject: subject.clone(),
                password: temporary_password.to_string(),
                groups: Vec::new(),
            },
        );
        Ok(subject)
    }

    async fn set_permanent_password(&self, email: &str, password: &str) -> Result<()> {
        self.check_policy(password)?;
        let mut accounts = lock(&self.accounts);
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| Error::identity("set password", format!("no account for {email}")))?;
        account.password = password.to_string();
        Ok(())
    }

    async fn delete_user(&self, email: &str) -> Result<()> {
        lock(&self.accounts)
            .remove(email)
            .map(|_| ())
            .ok_or_else(|| Error::identity("delete user", format!("no account for {email}")))
    }

    async fn add_to_group(&self, email: &str, group: &str) -> Result<()> {
        let mut accounts = lock(&self.accounts);
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| Error::identity("add to group", format!("no account for {email}")))?;
        if !account.groups.iter().any(|g| g == group) {
            account.groups.push(group.to_string());
        }
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let accounts = lock(&self.accounts);
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(AuthTokens {
                id_token: format!("id-token-{}", account.subject),
                access_token: format!("access-token-{}", account.subject),
                subject: account.subject.clone(),
            }),
            _ => Err(Error::Unauthorized(
                "Invalid email or password".to_string(),
            )),
        }
    }

    async fn groups_for_user(&self, email: &str) -> Result<Vec<String>> {
        Ok(self.groups_of(email))
    }

    async fn ensure_groups(&self, groups: &[&str]) -> Result<()> {
        let mut existing = lock(&self.groups);
        for group in groups {
            existing.insert(group.to_string());
        }
        Ok(())
    }
}
