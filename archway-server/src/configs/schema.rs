use crate::models::{ClientTable, NetworkTable, ScanSessionTable, Table};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table + Send + Sync>>,
}

impl SchemaManager {
    pub fn new(mut tables: Vec<Box<dyn Table + Send + Sync>>) -> Self {
        Self::sort_tables(&mut tables);
        Self { tables }
    }

    /// Orders tables so each one comes after everything it depends on.
    /// Dependencies that name no known table are ignored.
    fn sort_tables(tables: &mut Vec<Box<dyn Table + Send + Sync>>) {
        let mut pending = std::mem::take(tables);
        let known: Vec<&'static str> = pending.iter().map(|table| table.name()).collect();
        let mut sorted: Vec<Box<dyn Table + Send + Sync>> = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let ready = pending.iter().position(|table| {
                table.dependencies().iter().all(|dependency| {
                    !known.contains(dependency)
                        || sorted.iter().any(|resolved| resolved.name() == *dependency)
                })
            });

            match ready {
                Some(index) => sorted.push(pending.remove(index)),
                None => {
                    let names: Vec<_> = pending.iter().map(|table| table.name()).collect();
                    tracing::error!("circular table dependencies between {names:?}");
                    sorted.append(&mut pending);
                }
            }
        }

        *tables = sorted;
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![
            Box::new(ClientTable),
            Box::new(NetworkTable),
            Box::new(ScanSessionTable),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedTable(&'static str, Vec<&'static str>);

    impl Table for NamedTable {
        fn name(&self) -> &'static str {
            self.0
        }

        fn create(&self) -> String {
            format!("CREATE TABLE {};", self.0)
        }

        fn dispose(&self) -> String {
            format!("DROP TABLE {};", self.0)
        }

        fn dependencies(&self) -> Vec<&'static str> {
            self.1.clone()
        }
    }

    #[test]
    fn test_creation_order_follows_dependencies() {
        let manager = SchemaManager::new(vec![
            Box::new(NamedTable("observations", vec!["clients", "networks"])),
            Box::new(NamedTable("clients", vec!["networks"])),
            Box::new(NamedTable("networks", vec![])),
        ]);

        assert_eq!(
            manager.create_schema(),
            vec![
                "CREATE TABLE networks;",
                "CREATE TABLE clients;",
                "CREATE TABLE observations;"
            ]
        );
        assert_eq!(manager.dispose_schema()[0], "DROP TABLE observations;");
    }

    #[test]
    fn test_default_schema_creates_networks_before_clients() {
        let statements = SchemaManager::default().create_schema();
        let networks = statements.iter().position(|s| s.contains("networks (")).unwrap();
        let clients = statements.iter().position(|s| s.contains("clients (")).unwrap();

        assert!(networks < clients);
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let manager = SchemaManager::new(vec![
            Box::new(NamedTable("a", vec!["b"])),
            Box::new(NamedTable("b", vec!["a"])),
        ]);

        assert_eq!(manager.create_schema().len(), 2);
    }
}
