//! Static catalog of the service lines a prospect can inquire about, plus the marketing page
//! table served to the front end.

pub mod pages;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use pages::{MarketingPage, SiteRoute};

/// Stable identifier for a service line. The serialized form doubles as the `FormData` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceId {
    RealEstate,
    Mortgage,
    Insurance,
    Construction,
    PropertyManagement,
    HomeServices,
}

impl ServiceId {
    pub const ALL: [ServiceId; 6] = [
        ServiceId::RealEstate,
        ServiceId::Mortgage,
        ServiceId::Insurance,
        ServiceId::Construction,
        ServiceId::PropertyManagement,
        ServiceId::HomeServices,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            ServiceId::RealEstate => "realEstate",
            ServiceId::Mortgage => "mortgage",
            ServiceId::Insurance => "insurance",
            ServiceId::Construction => "construction",
            ServiceId::PropertyManagement => "propertyManagement",
            ServiceId::HomeServices => "homeServices",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(key.trim()))
    }

    pub fn category(self) -> &'static ServiceCategory {
        catalog()
            .iter()
            .find(|category| category.id == self)
            .unwrap_or(&CATALOG[0])
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Catalog entry shown on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub id: ServiceId,
    pub display_name: &'static str,
    pub description: &'static str,
    pub options: &'static [&'static str],
    pub image_url: &'static str,
}

static CATALOG: [ServiceCategory; 6] = [
    ServiceCategory {
        id: ServiceId::RealEstate,
        display_name: "Real Estate",
        description: "Buy, sell, or do both with a local agent who knows the Tampa Bay market.",
        options: &["Buy a home", "Sell a home", "Buy and sell"],
        image_url: "/images/services/real-estate.jpg",
    },
    ServiceCategory {
        id: ServiceId::Mortgage,
        display_name: "Mortgage",
        description: "Purchase and refinance loans with pricing from multiple lenders.",
        options: &["Purchase", "Refinance", "Cash-out refinance"],
        image_url: "/images/services/mortgage.jpg",
    },
    ServiceCategory {
        id: ServiceId::Insurance,
        display_name: "Insurance",
        description: "Homeowners, flood, wind, and auto coverage quotes.",
        options: &["Homeowners", "Flood", "Wind", "Auto", "Umbrella"],
        image_url: "/images/services/insurance.jpg",
    },
    ServiceCategory {
        id: ServiceId::Construction,
        display_name: "Construction",
        description: "Renovations, additions, and new builds with licensed contractors.",
        options: &["Renovation", "Addition", "New construction", "Roofing"],
        image_url: "/images/services/construction.jpg",
    },
    ServiceCategory {
        id: ServiceId::PropertyManagement,
        display_name: "Property Management",
        description: "Tenant placement, rent collection, and maintenance for rental owners.",
        options: &["Tenant placement", "Full-service management", "Leasing only"],
        image_url: "/images/services/property-management.jpg",
    },
    ServiceCategory {
        id: ServiceId::HomeServices,
        display_name: "Home Services",
        description: "Inspections, cleaning, moving, and repairs from vetted partners.",
        options: &["Inspection", "Cleaning", "Moving", "Repairs"],
        image_url: "/images/services/home-services.jpg",
    },
];

pub fn catalog() -> &'static [ServiceCategory] {
    &CATALOG
}
