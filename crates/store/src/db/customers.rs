//! Customer and address repository.

use sqlx::PgPool;

use emporium_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::{Address, AddressInput, Customer, CustomerInput};

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CustomerInput) -> Result<Customer, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO store.customer (first_name, last_name, email, phone_number, birth_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, phone_number, birth_date
            ",
        )
        .bind(input.first_name.as_str())
        .bind(input.last_name.as_str())
        .bind(&input.email)
        .bind(input.phone_number.as_str())
        .bind(input.birth_date)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        tracing::debug!(customer_id = %customer.id, "Created customer");
        Ok(customer)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored email no longer
    /// parses.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            SELECT id, first_name, last_name, email, phone_number, birth_date
            FROM store.customer
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Customers sharing an email address. Emails are not unique.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Vec<Customer>, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            SELECT id, first_name, last_name, email, phone_number, birth_date
            FROM store.customer
            WHERE email = $1
            ORDER BY id
            ",
        )
        .bind(email)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// List customers by last name, then first name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            SELECT id, first_name, last_name, email, phone_number, birth_date
            FROM store.customer
            ORDER BY last_name, first_name, id
            ",
        )
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Replace a customer's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn update(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            UPDATE store.customer
            SET first_name = $2, last_name = $3, email = $4, phone_number = $5, birth_date = $6
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone_number, birth_date
            ",
        )
        .bind(id)
        .bind(input.first_name.as_str())
        .bind(input.last_name.as_str())
        .bind(&input.email)
        .bind(input.phone_number.as_str())
        .bind(input.birth_date)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer and their address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` while the customer has orders and
    /// `RepositoryError::NotFound` if they do not exist.
    pub async fn delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.customer WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(customer_id = %id, "Deleted customer");
        Ok(())
    }

    // =========================================================================
    // Address
    // =========================================================================

    /// Create or replace the customer's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the customer does not
    /// exist.
    pub async fn set_address(
        &self,
        customer_id: CustomerId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(
            r"
            INSERT INTO store.address (customer_id, province, city, street)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id) DO UPDATE
            SET province = EXCLUDED.province,
                city = EXCLUDED.city,
                street = EXCLUDED.street
            RETURNING customer_id, province, city, street
            ",
        )
        .bind(customer_id)
        .bind(input.province.as_str())
        .bind(input.city.as_str())
        .bind(input.street.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Get the customer's address, if one is on file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_address(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT customer_id, province, city, street
            FROM store.address
            WHERE customer_id = $1
            ",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Remove the customer's address.
    ///
    /// Returns whether an address was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_address(&self, customer_id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.address WHERE customer_id = $1")
            .bind(customer_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
