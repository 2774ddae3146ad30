//! Subcommand arguments and handlers.
//!
//! Each handler performs one store operation and prints the result.
//! Partial updates are merged here: the store only accepts whole records.

use anyhow::{anyhow, Context, Result};
use chinook_core::{CustomerId, CustomerRecord, CustomerStore, NewCustomer, Pagination};
use clap::{Args, Subcommand};
use tracing::info;

use crate::render::{self, Format};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every customer
    List,
    /// Show one customer by id
    Get(IdArgs),
    /// Find customers whose first or last name contains a fragment
    Search(SearchArgs),
    /// Show one page of customers ordered by id
    Page(PageArgs),
    /// Add a new customer
    Add(AddArgs),
    /// Change selected fields of an existing customer
    Update(UpdateArgs),
    /// Count customers per country
    Countries,
    /// Rank customers by total amount spent
    TopSpenders(TopSpendersArgs),
    /// Show the genre(s) a customer buys most
    Genre(IdArgs),
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Customer id
    pub id: CustomerId,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Name fragment (case-insensitive); empty matches everyone
    #[arg(default_value = "")]
    pub fragment: String,
}

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Customers per page (1-100)
    #[arg(long, default_value_t = chinook_core::pagination::DEFAULT_PER_PAGE,
          value_parser = clap::value_parser!(u32).range(1..=100))]
    pub per_page: u32,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long = "first")]
    pub first_name: String,
    #[arg(long = "last")]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

impl From<AddArgs> for NewCustomer {
    fn from(args: AddArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            country: args.country,
            postal_code: args.postal_code,
            phone: args.phone,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Customer id
    pub id: CustomerId,
    #[arg(long = "first")]
    pub first_name: Option<String>,
    #[arg(long = "last")]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, conflicts_with = "clear_country")]
    pub country: Option<String>,
    #[arg(long, conflicts_with = "clear_postal_code")]
    pub postal_code: Option<String>,
    #[arg(long, conflicts_with = "clear_phone")]
    pub phone: Option<String>,
    /// Remove the stored country
    #[arg(long)]
    pub clear_country: bool,
    /// Remove the stored postal code
    #[arg(long)]
    pub clear_postal_code: bool,
    /// Remove the stored phone number
    #[arg(long)]
    pub clear_phone: bool,
}

impl UpdateArgs {
    /// Apply only the fields the user supplied on top of the stored record.
    pub fn merge_into(&self, mut record: CustomerRecord) -> CustomerRecord {
        if let Some(first) = &self.first_name {
            record.first_name = first.clone();
        }
        if let Some(last) = &self.last_name {
            record.last_name = last.clone();
        }
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        merge_optional(&mut record.country, &self.country, self.clear_country);
        merge_optional(&mut record.postal_code, &self.postal_code, self.clear_postal_code);
        merge_optional(&mut record.phone, &self.phone, self.clear_phone);
        record
    }
}

fn merge_optional(field: &mut Option<String>, value: &Option<String>, clear: bool) {
    if clear {
        *field = None;
    } else if let Some(value) = value {
        *field = Some(value.clone());
    }
}

#[derive(Args, Debug)]
pub struct TopSpendersArgs {
    /// Show only the first N customers
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn run<S: CustomerStore>(store: &S, command: Command, format: Format) -> Result<()> {
    let output = match command {
        Command::List => {
            let customers = store.get_all().await?;
            show(format, customers.as_slice(), render::customers)?
        }
        Command::Get(args) => {
            let customer = fetch(store, args.id).await?;
            show(format, &customer, render::customer)?
        }
        Command::Search(args) => {
            let customers = store.search_by_name(&args.fragment).await?;
            show(format, customers.as_slice(), render::customers)?
        }
        Command::Page(args) => {
            let page = Pagination::new(args.page, args.per_page);
            let customers = store.get_page(page.limit(), page.offset()).await?;
            show(format, customers.as_slice(), render::customers)?
        }
        Command::Add(args) => {
            let id = store
                .add_customer(&args.into())
                .await
                .context("Failed to add customer")?;
            info!(id, "Added customer");
            let customer = fetch(store, id).await?;
            show(format, &customer, render::customer)?
        }
        Command::Update(args) => {
            let existing = fetch(store, args.id).await?;
            let merged = args.merge_into(existing);
            store
                .update_customer(&merged)
                .await
                .context("Failed to update customer")?;
            info!(id = merged.id, "Updated customer");
            show(format, &merged, render::customer)?
        }
        Command::Countries => {
            let tallies = store.count_by_country().await?;
            show(format, tallies.as_slice(), render::tallies)?
        }
        Command::TopSpenders(args) => {
            let mut rankings = store.top_spenders().await?;
            if let Some(limit) = args.limit {
                rankings.truncate(limit);
            }
            show(format, rankings.as_slice(), render::spenders)?
        }
        Command::Genre(args) => {
            let affinities = store.most_popular_genre(args.id).await?;
            show(format, affinities.as_slice(), render::genres)?
        }
    };

    println!("{}", output);
    Ok(())
}

async fn fetch<S: CustomerStore>(store: &S, id: CustomerId) -> Result<CustomerRecord> {
    store
        .get_by_id(id)
        .await?
        .ok_or_else(|| anyhow!("Customer {} not found", id))
}

fn show<T, F>(format: Format, value: &T, text: F) -> Result<String>
where
    T: serde::Serialize + ?Sized,
    F: Fn(&T) -> String,
{
    match format {
        Format::Json => render::json(value),
        Format::Text => Ok(text(value)),
    }
}
