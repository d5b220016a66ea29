use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationType {
    Read,
    Get,
    Query,
    List,
    Fetch,
    Write,
    Update,
    Create,
    Delete,
    Insert,
    Modify,
    HealthCheck,
    Heartbeat,
    Status,
    Shutdown,
    Restart,
    ConfigUpdate,
}

impl OperationType {
    fn family(self) -> OperationFamily {
        use OperationType::*;
        match self {
            Read | Get | Query | List | Fetch => OperationFamily::Read,
            Write | Update | Create | Delete | Insert | Modify => OperationFamily::Write,
            HealthCheck | Heartbeat | Status => OperationFamily::Health,
            Shutdown | Restart | ConfigUpdate => OperationFamily::Admin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OperationFamily {
    Read,
    Write,
    Health,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegradationMode {
    Normal,
    ReadOnly,
    EssentialOnly,
    Offline,
}

/// Parses a whole-token operation name (e.g. "READ", "health_check") into
/// its `OperationType`. Unknown tokens default to `Read` — classification
/// is advisory, never a hard gate by itself.
pub fn parse_operation_type(operation: &str) -> OperationType {
    match operation.to_uppercase().as_str() {
        "READ" => OperationType::Read,
        "GET" => OperationType::Get,
        "QUERY" => OperationType::Query,
        "LIST" => OperationType::List,
        "FETCH" => OperationType::Fetch,
        "WRITE" => OperationType::Write,
        "UPDATE" => OperationType::Update,
        "CREATE" => OperationType::Create,
        "DELETE" => OperationType::Delete,
        "INSERT" => OperationType::Insert,
        "MODIFY" => OperationType::Modify,
        "HEALTH_CHECK" => OperationType::HealthCheck,
        "HEARTBEAT" => OperationType::Heartbeat,
        "STATUS" => OperationType::Status,
        "SHUTDOWN" => OperationType::Shutdown,
        "RESTART" => OperationType::Restart,
        "CONFIG_UPDATE" => OperationType::ConfigUpdate,
        _ => OperationType::Read,
    }
}

pub fn is_operation_type_allowed(op_type: OperationType, mode: DegradationMode) -> bool {
    let family = op_type.family();
    match mode {
        DegradationMode::Normal => true,
        DegradationMode::ReadOnly => matches!(family, OperationFamily::Read | OperationFamily::Health),
        DegradationMode::EssentialOnly => matches!(family, OperationFamily::Health),
        DegradationMode::Offline => false,
    }
}

/// Whole-token string classification: matches on `_`-separated tokens so
/// "read" inside "read_write" does not accidentally allow a write.
fn string_matches_family(operation: &str, family: OperationFamily) -> bool {
    let tokens: Vec<&str> = operation.to_lowercase().split('_').collect();
    let family_tokens: &[&str] = match family {
        OperationFamily::Read => &["read", "get", "query", "list", "fetch"],
        OperationFamily::Write => &["write", "update", "create", "delete", "insert", "modify"],
        OperationFamily::Health => &["health", "heartbeat", "status"],
        OperationFamily::Admin => &["shutdown", "restart", "config"],
    };
    tokens.iter().any(|t| family_tokens.contains(t))
}

fn degradation_severity(mode: DegradationMode) -> i64 {
    match mode {
        DegradationMode::Normal => 0,
        DegradationMode::ReadOnly => 1,
        DegradationMode::EssentialOnly => 2,
        DegradationMode::Offline => 3,
    }
}

pub struct DegradationManager {
    component_modes: RwLock<HashMap<String, DegradationMode>>,
}

impl Default for DegradationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationManager {
    pub fn new() -> Self {
        DegradationManager {
            component_modes: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_component_mode(&self, component: &str, mode: DegradationMode) {
        let mut modes = self.component_modes.write().unwrap();
        modes.insert(component.to_string(), mode);
        let worst = modes.values().map(|m| degradation_severity(*m)).max().unwrap_or(0);
        vcore_metrics::FAULT_METRICS.degradation_level.set(worst);
    }

    pub fn get_component_mode(&self, component: &str) -> DegradationMode {
        self.component_modes
            .read()
            .unwrap()
            .get(component)
            .copied()
            .unwrap_or(DegradationMode::Normal)
    }

    /// String-based classification kept for compatibility; prefer
    /// `is_operation_type_allowed`.
    pub fn is_operation_allowed(&self, component: &str, operation: &str) -> bool {
        let mode = self.get_component_mode(component);
        match mode {
            DegradationMode::Normal => true,
            DegradationMode::ReadOnly => {
                string_matches_family(operation, OperationFamily::Read)
                    || string_matches_family(operation, OperationFamily::Health)
            }
            DegradationMode::EssentialOnly => string_matches_family(operation, OperationFamily::Health),
            DegradationMode::Offline => false,
        }
    }

    pub fn is_operation_type_allowed(&self, component: &str, op_type: OperationType) -> bool {
        is_operation_type_allowed(op_type, self.get_component_mode(component))
    }

    pub fn get_system_status(&self) -> HashMap<String, DegradationMode> {
        self.component_modes.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_blocks_writes() {
        let mgr = DegradationManager::new();
        mgr.set_component_mode("rpc", DegradationMode::ReadOnly);
        assert!(mgr.is_operation_type_allowed("rpc", OperationType::Get));
        assert!(!mgr.is_operation_type_allowed("rpc", OperationType::Write));
        assert!(mgr.is_operation_type_allowed("rpc", OperationType::HealthCheck));
    }

    #[test]
    fn essential_only_blocks_reads_and_writes() {
        let mgr = DegradationManager::new();
        mgr.set_component_mode("rpc", DegradationMode::EssentialOnly);
        assert!(!mgr.is_operation_type_allowed("rpc", OperationType::Get));
        assert!(mgr.is_operation_type_allowed("rpc", OperationType::Heartbeat));
    }

    #[test]
    fn offline_blocks_everything() {
        let mgr = DegradationManager::new();
        mgr.set_component_mode("rpc", DegradationMode::Offline);
        assert!(!mgr.is_operation_type_allowed("rpc", OperationType::HealthCheck));
    }

    #[test]
    fn unset_component_defaults_to_normal() {
        let mgr = DegradationManager::new();
        assert!(mgr.is_operation_type_allowed("unknown", OperationType::Write));
    }

    #[test]
    fn string_classification_matches_whole_tokens_only() {
        let mgr = DegradationManager::new();
        mgr.set_component_mode("rpc", DegradationMode::ReadOnly);
        // "bread" must not match the "read" family via substring search.
        assert!(!mgr.is_operation_allowed("rpc", "bread"));
        assert!(mgr.is_operation_allowed("rpc", "read"));
        assert!(mgr.is_operation_allowed("rpc", "health_check"));
    }
}
