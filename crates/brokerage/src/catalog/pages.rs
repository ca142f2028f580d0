use serde::Serialize;

use super::ServiceId;

/// Front-end routes the site answers for. Anything else resolves to `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteRoute {
    Home,
    Questionnaire,
    ServiceQuestionnaire,
    Service(ServiceId),
    Review,
    NotFound,
}

impl SiteRoute {
    pub fn resolve(path: &str) -> Self {
        let without_query = path.trim().split(['?', '#']).next().unwrap_or_default();
        let trimmed = without_query.trim_end_matches('/');
        match trimmed {
            "" | "/" => Self::Home,
            "/questionnaire" => Self::Questionnaire,
            "/service-questionnaire" => Self::ServiceQuestionnaire,
            "/real-estate" => Self::Service(ServiceId::RealEstate),
            "/mortgage" => Self::Service(ServiceId::Mortgage),
            "/insurance" => Self::Service(ServiceId::Insurance),
            "/construction" => Self::Service(ServiceId::Construction),
            "/property-management" => Self::Service(ServiceId::PropertyManagement),
            "/home-services" => Self::Service(ServiceId::HomeServices),
            "/review" => Self::Review,
            _ => Self::NotFound,
        }
    }

    pub fn page(self) -> MarketingPage {
        match self {
            SiteRoute::Home => MarketingPage {
                route: self,
                title: "Your home, handled end to end",
                headline: "Real estate, lending, insurance, and home services under one roof.",
                service: None,
                call_to_action: Some("/service-questionnaire"),
            },
            SiteRoute::Questionnaire | SiteRoute::ServiceQuestionnaire => MarketingPage {
                route: self,
                title: "Tell us what you need",
                headline: "A few quick questions so the right specialist can follow up.",
                service: None,
                call_to_action: None,
            },
            SiteRoute::Service(id) => {
                let category = id.category();
                MarketingPage {
                    route: self,
                    title: category.display_name,
                    headline: category.description,
                    service: Some(id),
                    call_to_action: Some("/service-questionnaire"),
                }
            }
            SiteRoute::Review => MarketingPage {
                route: self,
                title: "What our clients say",
                headline: "Recent Google reviews from buyers, sellers, and borrowers.",
                service: None,
                call_to_action: None,
            },
            SiteRoute::NotFound => MarketingPage {
                route: self,
                title: "Page not found",
                headline: "The page you were looking for has moved or never existed.",
                service: None,
                call_to_action: Some("/"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingPage {
    pub route: SiteRoute,
    pub title: &'static str,
    pub headline: &'static str,
    pub service: Option<ServiceId>,
    pub call_to_action: Option<&'static str>,
}
