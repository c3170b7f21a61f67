// imperva-api: Async Rust client for the Imperva Cloud WAF REST API

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod models;
pub mod rules;
pub mod sessions;
pub mod sites;
pub mod stats;
pub mod transport;
pub mod wire;

pub use auth::{ApiGeneration, Credentials};
pub use client::{ClientConfig, DEFAULT_HOST, ImpervaClient};
pub use envelope::ApiResult;
pub use error::Error;
pub use models::{
    BlockDuration, BlockDurationPeriod, IncapRule, MalformedPoint, Rule, RuleAction, Site,
    SiteStatusTest, StatsCategory, StatsResponse, StatsSeries, TimeseriesPoint, Visit,
};
pub use sites::ListSitesOptions;
pub use stats::{SecurityFilter, StatsOptions, TimeRange, VisitOptions};
pub use transport::{RequestBody, TlsMode, TransportConfig};
pub use wire::{ActiveFlag, FlexId, OneOrMany};
