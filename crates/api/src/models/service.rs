//! Static catalog of offered services.

use serde::Serialize;

/// One entry of the service catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Service {
    /// URL slug.
    pub id: &'static str,
    pub name: &'static str,
    /// Icon key understood by the frontend.
    pub icon: &'static str,
    pub description: &'static str,
}

/// Every service Sparksonic offers, in display order.
pub const SERVICES: [Service; 9] = [
    Service {
        id: "solar-panels",
        name: "Solar Panels",
        icon: "solar",
        description: "Professional solar panel installation for residential and commercial properties.",
    },
    Service {
        id: "ev-chargers",
        name: "EV Chargers",
        icon: "ev",
        description: "Electric vehicle charging station installation with Creos subsidy support.",
    },
    Service {
        id: "heat-pumps",
        name: "Heat Pumps",
        icon: "heat",
        description: "Energy-efficient heat pump systems for sustainable heating and cooling.",
    },
    Service {
        id: "energy-audits",
        name: "Energy Audits",
        icon: "audit",
        description: "Comprehensive energy assessments to optimize your property's efficiency.",
    },
    Service {
        id: "electrician",
        name: "Electrician Services",
        icon: "electric",
        description: "Licensed electrical services for installations, repairs, and maintenance.",
    },
    Service {
        id: "air-conditioning",
        name: "Air Conditioning",
        icon: "ac",
        description: "Professional AC installation and maintenance services.",
    },
    Service {
        id: "home-automation",
        name: "Home Automation",
        icon: "automation",
        description: "Smart home solutions for modern living.",
    },
    Service {
        id: "security-systems",
        name: "Security & Alarm Systems",
        icon: "security",
        description: "Advanced security and alarm systems for your property.",
    },
    Service {
        id: "maintenance",
        name: "Maintenance Services",
        icon: "maintenance",
        description: "Regular maintenance and support for all electrical systems.",
    },
];
