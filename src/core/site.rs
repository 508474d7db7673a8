//! Site content documents - about, contact and logo.
//!
//! Each document is stored as JSON under a fixed key in `site_documents`. A document
//! that was never saved reads as its default, and any field missing from a stored
//! document is filled from the default as well.

use crate::{
    config::store::StoreConfig,
    core::category::{self, CategoryList},
    entities::{SiteDocument, SiteDocumentColumn, site_document},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument};

pub const ABOUT_KEY: &str = "siteConfig/about";
pub const CONTACT_KEY: &str = "siteConfig/contact";
pub const LOGO_KEY: &str = "siteConfig/logo";

/// One figure in the about section, e.g. `10K+` / `Burgers servidas`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

impl Stat {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// The "our story" section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutData {
    pub badge: String,
    pub title: String,
    pub highlight: String,
    pub paragraph1: String,
    pub paragraph2: String,
    pub values: Vec<String>,
    pub stats: Vec<Stat>,
    pub image_url: String,
    pub image_caption: String,
    pub since: String,
}

impl Default for AboutData {
    fn default() -> Self {
        Self {
            badge: "Nuestra Historia".to_string(),
            title: "Nacimos del amor".to_string(),
            highlight: "por la buena carne".to_string(),
            paragraph1: "Zequi Smash Burgers nació de una pasión genuina por las hamburguesas \
                artesanales. Lo que comenzó como experimentos caseros se convirtió en una obsesión \
                por la técnica smash: presionar la carne en plancha ardiente para crear esa costra \
                crujiente y caramelizada que nos hace únicos."
                .to_string(),
            paragraph2: "Cada hamburguesa es elaborada con carne 100% premium, ingredientes \
                frescos seleccionados y salsas artesanales que hemos perfeccionado con el tiempo. \
                No es solo comida — es una experiencia."
                .to_string(),
            values: ["Artesanal", "Premium", "Pasión", "Calidad"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            stats: vec![
                Stat::new("10K+", "Burgers servidas"),
                Stat::new("4.9★", "Calificación"),
                Stat::new("100%", "Carne premium"),
                Stat::new("2023", "Desde"),
            ],
            image_url: String::new(),
            image_caption: "Nuestro proceso artesanal".to_string(),
            since: "Desde 2023".to_string(),
        }
    }
}

/// Location, schedule and contact channels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactData {
    pub title: String,
    pub highlight: String,
    pub description: String,
    pub instagram_handle: String,
    pub instagram_url: String,
    pub address1: String,
    pub address2: String,
    pub maps_url: String,
    pub schedule_weekday: String,
    pub schedule_weekend: String,
    pub phone: String,
    pub phone_note: String,
    pub email1: String,
    pub email2: String,
}

impl Default for ContactData {
    fn default() -> Self {
        Self {
            title: "Encuéntranos".to_string(),
            highlight: "Estamos cerca".to_string(),
            description: "¿Listo para la mejor smash burger de tu vida? Encuéntranos.".to_string(),
            instagram_handle: "@zequismashburgers".to_string(),
            instagram_url: "https://instagram.com/zequismashburgers".to_string(),
            address1: "Tu ciudad, Ecuador".to_string(),
            address2: "Barrio / Sector".to_string(),
            maps_url: "https://maps.google.com".to_string(),
            schedule_weekday: "Lun – Vie: 12:00 – 22:00".to_string(),
            schedule_weekend: "Sáb – Dom: 12:00 – 23:00".to_string(),
            phone: "+593 99 999 9999".to_string(),
            phone_note: "También por WhatsApp".to_string(),
            email1: "info@zequiburgers.com".to_string(),
            email2: "pedidos@zequiburgers.com".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoMode {
    #[default]
    Text,
    Image,
}

/// Brand mark shown in the navbar and used for the app icons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoData {
    pub mode: LogoMode,
    /// Letter drawn inside the square/disc, at most two characters
    pub letter: String,
    pub name: String,
    pub tagline: String,
    /// Data URL of the uploaded logo, empty in text mode
    pub image_base64: String,
}

impl Default for LogoData {
    fn default() -> Self {
        Self {
            mode: LogoMode::Text,
            letter: "Z".to_string(),
            name: "ZEQUI".to_string(),
            tagline: "SMASH BURGERS".to_string(),
            image_base64: String::new(),
        }
    }
}

/// Reads and decodes the document stored under `key`.
pub async fn read_document<T: DeserializeOwned>(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<T>> {
    let Some(row) = SiteDocument::find_by_id(key.to_string()).one(db).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&row.value)?;
    Ok(Some(value))
}

/// Replaces the document stored under `key`, creating it if needed.
pub async fn write_document<T: Serialize>(
    db: &DatabaseConnection,
    key: &str,
    value: &T,
) -> Result<()> {
    let document = site_document::ActiveModel {
        key: Set(key.to_string()),
        value: Set(serde_json::to_string(value)?),
        updated_at: Set(Utc::now()),
    };
    SiteDocument::insert(document)
        .on_conflict(
            OnConflict::column(SiteDocumentColumn::Key)
                .update_columns([SiteDocumentColumn::Value, SiteDocumentColumn::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    debug!("Wrote site document {key}");
    Ok(())
}

async fn document_exists(db: &DatabaseConnection, key: &str) -> Result<bool> {
    Ok(SiteDocument::find_by_id(key.to_string())
        .one(db)
        .await?
        .is_some())
}

pub async fn load_about(db: &DatabaseConnection, fallback: &AboutData) -> Result<AboutData> {
    Ok(read_document(db, ABOUT_KEY)
        .await?
        .unwrap_or_else(|| fallback.clone()))
}

pub async fn load_contact(db: &DatabaseConnection, fallback: &ContactData) -> Result<ContactData> {
    Ok(read_document(db, CONTACT_KEY)
        .await?
        .unwrap_or_else(|| fallback.clone()))
}

pub async fn load_logo(db: &DatabaseConnection, fallback: &LogoData) -> Result<LogoData> {
    Ok(read_document(db, LOGO_KEY)
        .await?
        .unwrap_or_else(|| fallback.clone()))
}

#[instrument(skip_all)]
pub async fn save_about(db: &DatabaseConnection, about: &AboutData) -> Result<()> {
    write_document(db, ABOUT_KEY, about).await
}

#[instrument(skip_all)]
pub async fn save_contact(db: &DatabaseConnection, contact: &ContactData) -> Result<()> {
    write_document(db, CONTACT_KEY, contact).await
}

/// Saves the logo; the letter may be at most two characters.
#[instrument(skip_all, fields(mode = ?logo.mode))]
pub async fn save_logo(db: &DatabaseConnection, logo: &LogoData) -> Result<()> {
    if logo.letter.chars().count() > 2 {
        return Err(Error::validation("Logo letter can be at most 2 characters"));
    }
    write_document(db, LOGO_KEY, logo).await
}

/// Writes the configured default for every site document that does not exist yet.
///
/// Returns how many documents were created. Existing documents are never touched.
#[instrument(skip_all)]
pub async fn initialize_defaults(db: &DatabaseConnection, config: &StoreConfig) -> Result<usize> {
    let mut written = 0;
    if !document_exists(db, ABOUT_KEY).await? {
        write_document(db, ABOUT_KEY, &config.content.about).await?;
        written += 1;
    }
    if !document_exists(db, CONTACT_KEY).await? {
        write_document(db, CONTACT_KEY, &config.content.contact).await?;
        written += 1;
    }
    if !document_exists(db, LOGO_KEY).await? {
        write_document(db, LOGO_KEY, &config.content.logo).await?;
        written += 1;
    }
    if !document_exists(db, category::CATEGORIES_KEY).await? {
        let list = CategoryList {
            list: config.store.default_categories.clone(),
        };
        write_document(db, category::CATEGORIES_KEY, &list).await?;
        written += 1;
    }

    if written > 0 {
        info!("Initialized {written} default site document(s)");
    }
    Ok(written)
}
