use std::sync::Arc;
use tracing::info;

use crate::error::{HelpdeskError, Result};
use crate::models::Department;
use crate::store::DepartmentStore;

pub const MAX_NAME_CHARS: usize = 100;

#[derive(Clone)]
pub struct DepartmentService {
    store: Arc<dyn DepartmentStore>,
}

impl DepartmentService {
    pub fn new(store: Arc<dyn DepartmentStore>) -> Self {
        Self { store }
    }

    pub fn create_department(&self, name: &str, description: Option<&str>) -> Result<Department> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HelpdeskError::validation("Department name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(HelpdeskError::validation(format!(
                "Department name must be at most {} characters",
                MAX_NAME_CHARS
            )));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let department = self
            .store
            .create_department(name, description)?
            .ok_or_else(|| {
                HelpdeskError::conflict(format!("Department '{}' already exists", name))
            })?;
        info!(department_id = department.id, "Created department");
        Ok(department)
    }

    pub fn get_department(&self, id: i64) -> Result<Department> {
        self.store
            .get_department(id)?
            .ok_or_else(|| HelpdeskError::not_found("Department", id))
    }

    pub fn list_departments(&self) -> Result<Vec<Department>> {
        Ok(self.store.list_departments()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> DepartmentService {
        DepartmentService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_create_trims_and_drops_blank_description() {
        let department = service()
            .create_department("  Facilities ", Some("   "))
            .unwrap();
        assert_eq!(department.name, "Facilities");
        assert_eq!(department.description, None);
    }

    #[test]
    fn test_blank_or_long_name_rejected() {
        let departments = service();
        for bad in ["   ".to_string(), "x".repeat(MAX_NAME_CHARS + 1)] {
            let err = departments.create_department(&bad, None).unwrap_err();
            assert!(matches!(err, HelpdeskError::Validation(_)));
        }
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let departments = service();
        departments.create_department("Network", None).unwrap();
        let err = departments.create_department("network", None).unwrap_err();
        assert!(matches!(err, HelpdeskError::Conflict(_)));
    }

    #[test]
    fn test_get_missing_department() {
        let err = service().get_department(3).unwrap_err();
        assert_eq!(err.to_string(), "Department 3 not found");
    }
}
