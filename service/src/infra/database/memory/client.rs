//! [`Memory`] database client definitions.

use std::{future::Future, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::State;
#[cfg(doc)]
use super::Memory;

/// Access to a [`State`] of a [`Memory`] database.
pub trait Storage {
    /// Reads the [`State`] with the provided function.
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> impl Future<Output = R>;

    /// Modifies the [`State`] with the provided function.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = R>;
}

/// Non-transactional [`Memory`] database client.
///
/// Holds the [`State`] lock only for the duration of a single operation.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the database.
    pub(crate) state: Arc<Mutex<State>>,
}

impl Storage for NonTx {
    async fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&*self.state.lock().await)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut *self.state.lock().await)
    }
}

/// Transactional [`Memory`] database client.
///
/// Acquires the [`State`] lock lazily on its first operation and holds it
/// until committed or dropped. Changes are staged on a copy of the [`State`]
/// and are discarded unless committed.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Shared [`State`] of the database.
    state: Arc<Mutex<State>>,

    /// Staged changes along with the held [`State`] lock, once acquired.
    inner: Arc<Mutex<Option<Staged>>>,
}

/// Staged changes of a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Held lock of the shared [`State`].
    guard: OwnedMutexGuard<State>,

    /// Working copy of the [`State`].
    state: State,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            state: Arc::clone(&client.state),
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs the provided function over the staged [`State`], acquiring the
    /// shared [`State`] lock if not yet.
    async fn with_staged<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut inner = self.inner.lock().await;
        let staged = if let Some(staged) = inner.take() {
            staged
        } else {
            let guard = Arc::clone(&self.state).lock_owned().await;
            let state = (*guard).clone();
            Staged { guard, state }
        };
        f(&mut inner.insert(staged).state)
    }

    /// Commits this [`Tx`] client, releasing the held [`State`] lock.
    pub async fn commit(&self) {
        if let Some(Staged { mut guard, state }) = self.inner.lock().await.take()
        {
            *guard = state;
        }
    }
}

impl Storage for Tx {
    async fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        self.with_staged(|s| f(s)).await
    }

    async fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        self.with_staged(f).await
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{customer, Customer};

    use super::{NonTx, Storage as _, Tx};

    fn customer() -> Customer {
        Customer {
            id: customer::Id::new(),
            first_name: customer::Name::new("Ada").unwrap(),
            last_name: customer::Name::new("Lovelace").unwrap(),
            email: customer::Email::new("ada@example.com").unwrap(),
            phone: customer::Phone::new("+1 555 010 0000").unwrap(),
            driver_license_number: customer::DriverLicenseNumber::new("DL-1")
                .unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn commits_staged_changes() {
        let db = NonTx::default();
        let c = customer();

        let tx = Tx::from_non_tx(&db);
        tx.write(|s| s.customers.insert(c.id, c.clone())).await;
        assert!(tx.read(|s| s.customers.contains_key(&c.id)).await);
        tx.commit().await;

        assert!(db.read(|s| s.customers.contains_key(&c.id)).await);
    }

    #[tokio::test]
    async fn discards_uncommitted_changes() {
        let db = NonTx::default();
        let c = customer();

        {
            let tx = Tx::from_non_tx(&db);
            tx.write(|s| s.customers.insert(c.id, c.clone())).await;
        }

        assert!(db.read(|s| s.customers.is_empty()).await);
    }

    #[tokio::test]
    async fn serializes_transactions() {
        let db = NonTx::default();

        let first = Tx::from_non_tx(&db);
        first.read(|_| ()).await;

        let second = Tx::from_non_tx(&db);
        let c = customer();
        let id = c.id;
        let pending = tokio::spawn(async move {
            second
                .read(|s| s.customers.contains_key(&id))
                .await
        });

        first.write(|s| s.customers.insert(c.id, c.clone())).await;
        first.commit().await;

        assert!(pending.await.unwrap());
    }
}
