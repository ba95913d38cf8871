use tokio::task::AbortHandle;
use woostore_core::{Customer, CustomerId, CustomerPatch, Email, NewCustomer};

use super::{ScreenScope, Slot};
use crate::repository::Repository;

/// Customer profile: look up, register or edit the shopper's account.
///
/// All three actions write the same `customer` slot; the latest one wins.
#[derive(Debug)]
pub struct AccountScreen {
    repository: Repository,
    scope: ScreenScope,
    customer: Slot<Customer>,
    running: Option<AbortHandle>,
}

impl AccountScreen {
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            scope: ScreenScope::new(),
            customer: Slot::absent(),
            running: None,
        }
    }

    /// Look up the account registered under `email`.
    pub fn find(&mut self, email: &Email) {
        let stream = self.repository.customer_by_email(email);
        self.scope
            .relaunch(&mut self.running, stream, &self.customer);
    }

    pub fn register(&mut self, customer: NewCustomer) {
        let stream = self.repository.create_customer(customer);
        self.scope
            .relaunch_mutation(&mut self.running, stream, &self.customer);
    }

    pub fn update(&mut self, id: CustomerId, patch: CustomerPatch) {
        let stream = self.repository.update_customer(id, patch);
        self.scope
            .relaunch_mutation(&mut self.running, stream, &self.customer);
    }

    #[must_use]
    pub const fn customer(&self) -> &Slot<Customer> {
        &self.customer
    }

    pub async fn destroy(self) {
        self.scope.destroy().await;
    }
}
