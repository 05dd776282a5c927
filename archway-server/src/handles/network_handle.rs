use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use archway_api::models::{ClientRecord, EncryptionKind, MacAddress};
use archway_api::restful::*;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::configs::Api;
use crate::errors::{ApiError, QueryError, RegistryError};
use crate::services::{
    EventBus, NetworkFilter, PageRequest, RegistryService, ScanEvent, SecurityService, SortSpec,
    network_fingerprint,
};

/// Raw paging parameters. Kept as strings so that malformed values are
/// reported as invalid arguments instead of being silently defaulted.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct NetworkQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub ssid: Option<String>,
    pub encryption: Option<String>,
    pub channel: Option<String>,
    pub min_signal: Option<String>,
}

fn parse<T>(name: &'static str, raw: Option<&str>) -> Result<Option<T>, QueryError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|e| QueryError::invalid(name, e.to_string()))
    })
    .transpose()
}

pub(crate) fn page_request(query: &PageQuery, api: &Api) -> Result<PageRequest, QueryError> {
    let page = parse::<u32>("page", query.page.as_deref())?.unwrap_or(1);
    if page < 1 {
        return Err(QueryError::invalid("page", "must be at least 1"));
    }

    let per_page = parse::<u32>("per_page", query.per_page.as_deref())?
        .unwrap_or(api.default_per_page);
    if per_page < 1 || per_page > api.max_per_page {
        return Err(QueryError::invalid(
            "per_page",
            format!("must be between 1 and {}", api.max_per_page),
        ));
    }

    Ok(PageRequest { page, per_page })
}

fn network_params(
    query: &NetworkQuery,
    api: &Api,
) -> Result<(NetworkFilter, SortSpec, PageRequest), QueryError> {
    let page = page_request(&query.paging, api)?;

    let sort = SortSpec {
        key: parse("sort_by", query.sort_by.as_deref())?.unwrap_or_default(),
        order: parse("order", query.order.as_deref())?.unwrap_or_default(),
    };

    let filter = NetworkFilter {
        ssid: query.ssid.clone().filter(|ssid| !ssid.is_empty()),
        encryption: parse::<EncryptionKind>("encryption", query.encryption.as_deref())?,
        channel: parse::<u16>("channel", query.channel.as_deref())?,
        min_signal: parse::<i32>("min_signal", query.min_signal.as_deref())?,
    };

    Ok((filter, sort, page))
}

#[derive(Clone)]
pub struct NetworkState {
    pub registry_service: Arc<RegistryService>,
    pub security_service: Arc<SecurityService>,
    pub event_bus: Arc<EventBus>,
    pub api: Api,
}

pub fn network_router(network_state: NetworkState) -> Router {
    Router::new()
        .route("/api/networks", get(get_networks).delete(clear_networks))
        .route("/api/networks/:bssid", get(get_network))
        .route("/api/clients", get(get_clients))
        .route("/api/clients/:mac", get(get_client))
        .with_state(network_state)
}

#[utoipa::path(
    get,
    path = "/api/networks",
    tag = "network",
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("sort_by" = Option<SortKey>, Query, description = "Sort key, last_seen when omitted"),
        ("order" = Option<SortOrder>, Query, description = "asc or desc, desc when omitted"),
        ("ssid" = Option<String>, Query, description = "Case-insensitive SSID substring"),
        ("encryption" = Option<String>, Query, description = "Exact encryption kind"),
        ("channel" = Option<u16>, Query, description = "Exact channel"),
        ("min_signal" = Option<i32>, Query, description = "Minimum signal strength in dBm")
    ),
    responses(
        (status = 200, description = "One page of discovered networks", body = NetworkListResponse),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse)
    )
)]
pub async fn get_networks(
    State(state): State<NetworkState>,
    Query(query): Query<NetworkQuery>,
) -> Result<Json<ApiResponse<NetworkListResponse>>, ApiError> {
    let (filter, sort, page) = network_params(&query, &state.api)?;

    let page = state
        .registry_service
        .list_networks(&filter, sort, page)
        .await;

    Ok(Json(ApiResponse::ok(NetworkListResponse {
        pagination: Pagination::from(&page),
        networks: page.items,
    })))
}

#[utoipa::path(
    get,
    path = "/api/networks/{bssid}",
    tag = "network",
    params(
        ("bssid" = String, Path, description = "Access point MAC address")
    ),
    responses(
        (status = 200, description = "Network with its risk assessment and clients", body = NetworkDetailResponse),
        (status = 400, description = "Malformed BSSID", body = ErrorResponse),
        (status = 404, description = "Network not found", body = ErrorResponse)
    )
)]
pub async fn get_network(
    State(state): State<NetworkState>,
    Path(bssid): Path<String>,
) -> Result<Json<ApiResponse<NetworkDetailResponse>>, ApiError> {
    let bssid = bssid
        .parse::<MacAddress>()
        .map_err(|e| QueryError::invalid("bssid", e.to_string()))?;

    let snapshot = state.registry_service.snapshot().await;
    let network = snapshot
        .networks
        .iter()
        .find(|network| network.bssid == bssid)
        .ok_or(RegistryError::NetworkNotFound(bssid))?;
    let security = state
        .security_service
        .assess_one(&bssid, &snapshot.networks)
        .ok_or(RegistryError::NetworkNotFound(bssid))?;
    let clients = state.registry_service.clients_of(&bssid).await;

    Ok(Json(ApiResponse::ok(NetworkDetailResponse {
        fingerprint: network_fingerprint(network),
        network: network.as_ref().clone(),
        security,
        clients,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/networks",
    tag = "network",
    responses(
        (status = 200, description = "Registry emptied", body = ClearRegistryResponse)
    )
)]
pub async fn clear_networks(
    State(state): State<NetworkState>,
) -> Result<Json<ApiResponse<ClearRegistryResponse>>, ApiError> {
    let (networks_removed, clients_removed) = state.registry_service.clear().await;

    tracing::info!("Registry cleared ({networks_removed} networks, {clients_removed} clients)");
    state.event_bus.publish(ScanEvent::RegistryCleared {
        timestamp: OffsetDateTime::now_utc(),
    });

    Ok(Json(ApiResponse::ok(ClearRegistryResponse {
        networks_removed,
        clients_removed,
    })))
}

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "network",
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Clients, most recently seen first", body = ClientListResponse),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse)
    )
)]
pub async fn get_clients(
    State(state): State<NetworkState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<ClientListResponse>>, ApiError> {
    let page = page_request(&query, &state.api)?;
    let page = state.registry_service.list_clients(page).await;

    Ok(Json(ApiResponse::ok(ClientListResponse {
        pagination: Pagination::from(&page),
        clients: page.items,
    })))
}

#[utoipa::path(
    get,
    path = "/api/clients/{mac}",
    tag = "network",
    params(
        ("mac" = String, Path, description = "Client MAC address")
    ),
    responses(
        (status = 200, description = "A single client", body = ClientRecord),
        (status = 400, description = "Malformed MAC address", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
pub async fn get_client(
    State(state): State<NetworkState>,
    Path(mac): Path<String>,
) -> Result<Json<ApiResponse<ClientRecord>>, ApiError> {
    let mac = mac
        .parse::<MacAddress>()
        .map_err(|e| QueryError::invalid("mac", e.to_string()))?;

    let client = state.registry_service.get_client(&mac).await?;

    Ok(Json(ApiResponse::ok(client)))
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;

    use super::*;

    fn query(pairs: &[(&str, &str)]) -> NetworkQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let uri = format!("/api/networks?{encoded}").parse::<Uri>().unwrap();
        Query::<NetworkQuery>::try_from_uri(&uri)
            .unwrap()
            .0
    }

    #[test]
    fn test_defaults_apply_only_when_missing() {
        let (filter, sort, page) = network_params(&query(&[]), &Api::default()).unwrap();

        assert_eq!(filter, NetworkFilter::default());
        assert_eq!(sort.key, SortKey::LastSeen);
        assert_eq!(sort.order, SortOrder::Desc);
        assert_eq!(page, PageRequest { page: 1, per_page: 50 });
    }

    #[test]
    fn test_filters_are_parsed() {
        let (filter, sort, page) = network_params(
            &query(&[
                ("page", "3"),
                ("per_page", "10"),
                ("sort_by", "signal_strength"),
                ("order", "asc"),
                ("ssid", "office"),
                ("encryption", "WPA2"),
                ("channel", "6"),
                ("min_signal", "-70"),
            ]),
            &Api::default(),
        )
        .unwrap();

        assert_eq!(page, PageRequest { page: 3, per_page: 10 });
        assert_eq!(sort.key, SortKey::SignalStrength);
        assert_eq!(sort.order, SortOrder::Asc);
        assert_eq!(filter.ssid.as_deref(), Some("office"));
        assert_eq!(filter.encryption, Some(EncryptionKind::Wpa2));
        assert_eq!(filter.channel, Some(6));
        assert_eq!(filter.min_signal, Some(-70));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let api = Api::default();
        let cases: &[(&str, &str)] = &[
            ("page", "0"),
            ("page", "abc"),
            ("per_page", "0"),
            ("per_page", "201"),
            ("sort_by", "bogus"),
            ("order", "up"),
            ("channel", "six"),
            ("min_signal", "loud"),
        ];

        for &(name, value) in cases {
            let result = network_params(&query(&[(name, value)]), &api);
            assert!(
                matches!(result, Err(QueryError::InvalidParameter { name: n, .. }) if n == name),
                "{name}={value} should be rejected"
            );
        }
    }
}
