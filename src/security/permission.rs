use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! permissions {
    ($($variant:ident => $code:literal, $label:literal;)+) => {
        /// One authorizable action. The string code is what tokens and the permissions API carry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Permission {
            $($variant,)+
        }

        impl Permission {
            pub const ALL: &'static [Permission] = &[$(Permission::$variant,)+];

            pub fn code(self) -> &'static str {
                match self {
                    $(Permission::$variant => $code,)+
                }
            }

            /// Human-readable label, used when seeding permission definitions
            pub fn label(self) -> &'static str {
                match self {
                    $(Permission::$variant => $label,)+
                }
            }
        }

        impl FromStr for Permission {
            type Err = UnknownPermission;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Permission::$variant),)+
                    other => Err(UnknownPermission(other.to_string())),
                }
            }
        }
    };
}

permissions! {
    FilialesView => "filiales.view", "Voir sa filiale";
    FilialesViewAll => "filiales.view_all", "Voir toutes les filiales";
    FilialesManage => "filiales.manage", "Gérer les filiales";
    FilialesCreate => "filiales.create", "Créer une filiale";
    FilialesUpdate => "filiales.update", "Modifier une filiale";
    FilialesDelete => "filiales.delete", "Supprimer une filiale";

    KbCategoriesView => "kb_categories.view", "Voir les catégories de la base de connaissances";
    KbCategoriesCreate => "kb_categories.create", "Créer une catégorie";
    KbCategoriesUpdate => "kb_categories.update", "Modifier une catégorie";
    KbCategoriesDelete => "kb_categories.delete", "Supprimer une catégorie";

    RequestSourcesView => "request_sources.view", "Voir les sources de demande";
    RequestSourcesCreate => "request_sources.create", "Créer une source de demande";
    RequestSourcesUpdate => "request_sources.update", "Modifier une source de demande";
    RequestSourcesDelete => "request_sources.delete", "Supprimer une source de demande";

    ServiceRequestsView => "service_requests.view", "Voir les demandes de service";
    ServiceRequestsViewAll => "service_requests.view_all", "Voir toutes les demandes de service";
    ServiceRequestsCreate => "service_requests.create", "Créer une demande de service";
    ServiceRequestsUpdate => "service_requests.update", "Modifier une demande de service";
    ServiceRequestsDelete => "service_requests.delete", "Supprimer une demande de service";
    ServiceRequestsValidate => "service_requests.validate", "Valider une demande de service";
    ServiceRequestsFilterByFiliale => "service_requests.filter_by_filiale", "Filtrer les demandes par filiale";

    ServiceRequestTypesView => "service_request_types.view", "Voir les types de demande";
    ServiceRequestTypesCreate => "service_request_types.create", "Créer un type de demande";
    ServiceRequestTypesUpdate => "service_request_types.update", "Modifier un type de demande";
    ServiceRequestTypesDelete => "service_request_types.delete", "Supprimer un type de demande";

    TimeEntriesView => "time_entries.view", "Voir les saisies de temps";
    TimeEntriesCreate => "time_entries.create", "Saisir du temps";
    TimeEntriesUpdate => "time_entries.update", "Modifier une saisie de temps";
    TimeEntriesDelete => "time_entries.delete", "Supprimer une saisie de temps";
    TimeEntriesValidate => "time_entries.validate", "Valider une saisie de temps";

    PermissionsView => "permissions.view", "Voir les permissions";
    PermissionsManage => "permissions.manage", "Gérer les permissions";

    StatsView => "stats.view", "Voir les statistiques";
}

impl Permission {
    /// Code prefix before the first `.`, e.g. `filiales`
    pub fn module(self) -> &'static str {
        let code = self.code();
        code.split_once('.').map_or(code, |(module, _)| module)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission code: {0}")]
pub struct UnknownPermission(pub String);

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_parse_back_to_variants() {
        for permission in Permission::ALL {
            assert_eq!(permission.code().parse::<Permission>(), Ok(*permission));
        }
    }

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<&str> = Permission::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(codes.len(), Permission::ALL.len());
    }

    #[test]
    fn module_is_code_prefix() {
        assert_eq!(Permission::FilialesViewAll.module(), "filiales");
        assert_eq!(Permission::ServiceRequestsFilterByFiliale.module(), "service_requests");
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert_eq!(
            "tickets.fly".parse::<Permission>(),
            Err(UnknownPermission("tickets.fly".to_string()))
        );
    }
}
