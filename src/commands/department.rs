use anyhow::Result;

use helpdesk::Services;

pub fn add(services: &Services, name: &str, description: Option<&str>) -> Result<()> {
    let department = services.departments.create_department(name, description)?;
    println!("Created department #{} {}", department.id, department.name);
    Ok(())
}

pub fn list(services: &Services) -> Result<()> {
    let departments = services.departments.list_departments()?;

    if departments.is_empty() {
        println!("No departments found.");
        return Ok(());
    }

    for department in departments {
        match department.description {
            Some(description) => {
                println!("#{:<4} {:<24} {}", department.id, department.name, description)
            }
            None => println!("#{:<4} {}", department.id, department.name),
        }
    }
    Ok(())
}
