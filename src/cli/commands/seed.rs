use anyhow::Context;
use chrono::NaiveDate;

use crate::cache;
use crate::cache::Invalidator;
use crate::config::config;
use crate::database::models::asset::NewAsset;
use crate::database::models::category::NewCategory;
use crate::database::models::department::NewDepartment;
use crate::database::models::employee::NewEmployee;
use crate::database::schema::ensure_schema;
use crate::database::DatabaseManager;
use crate::services::asset_service::AssetService;
use crate::services::category_service::CategoryService;
use crate::services::department_service::DepartmentService;
use crate::services::employee_service::EmployeeService;
use crate::services::ServiceError;
use crate::types::AssetStatus;

const DEPARTMENTS: &[(&str, &str)] = &[
    ("Engineering", "Software Engineering"),
    ("Design", "Product Design"),
    ("Operations", "IT Operations"),
    ("Finance", "Finance and Accounting"),
    ("People", "People and Culture"),
];

const CATEGORIES: &[&str] = &["Laptop", "Monitor", "Phone", "Keyboard", "Dock"];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Boris", "Clara", "Dejan", "Elena", "Filip", "Greta", "Hugo", "Iva", "Jonas",
];

const LAST_NAMES: &[&str] = &[
    "Kovac", "Lund", "Meier", "Novak", "Olsen", "Petrov", "Quint", "Riva", "Sato", "Toma",
];

const POSITIONS: &[&str] = &[
    "Backend Developer",
    "Frontend Developer",
    "UX Designer",
    "SysAdmin",
    "Accountant",
];

/// Seeds demo data through the services so registrations land in the
/// reassignment history and caches are invalidated the same way API
/// writes would do it.
pub async fn handle(employees: u32) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect().await?;
    ensure_schema(&pool).await?;

    let settings = config();
    let backend = cache::connect_from_config(&settings.cache).await;
    let invalidator = Invalidator::new(backend, settings.cache.key_prefix.clone());

    let department_service = DepartmentService::new(pool.clone());
    let category_service = CategoryService::new(pool.clone());
    let employee_service = EmployeeService::new(pool.clone(), invalidator.clone());
    let asset_service = AssetService::new(pool.clone(), invalidator);

    for (name, full_name) in DEPARTMENTS {
        match department_service
            .create(NewDepartment {
                name: name.to_string(),
                full_name: Some(full_name.to_string()),
            })
            .await
        {
            Ok(_) | Err(ServiceError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    let departments = department_service.list().await?;
    println!("Departments: {}", departments.len());

    for name in CATEGORIES {
        match category_service
            .create(NewCategory {
                name: name.to_string(),
            })
            .await
        {
            Ok(_) | Err(ServiceError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    let categories = category_service.list().await?;
    println!("Categories: {}", categories.len());

    let mut employee_ids = Vec::new();
    for i in 0..employees as usize {
        let first = FIRST_NAMES[i % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()];
        let username = format!("{}.{}{}", first.to_lowercase(), last.to_lowercase(), i + 1);
        let department = &departments[i % departments.len()];

        match employee_service
            .create(NewEmployee {
                username: username.clone(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: format!("{}@example.com", username),
                department: department.id,
                position: POSITIONS[i % POSITIONS.len()].to_string(),
            })
            .await
        {
            Ok(employee) => employee_ids.push(employee.id),
            Err(ServiceError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    println!("Employees: {}", employee_ids.len());

    let mut assets_created = 0;
    for (i, employee_id) in employee_ids.iter().enumerate() {
        let category = &categories[i % categories.len()];
        let purchase_date = NaiveDate::from_ymd_opt(2023, (i % 12) as u32 + 1, (i % 28) as u32 + 1)
            .context("invalid seed date")?;

        // Every employee gets one asset; every third stays in storage.
        let assigned_to = if i % 3 == 2 { None } else { Some(*employee_id) };
        match asset_service
            .create(NewAsset {
                name: format!("{} {}", category.name, i + 1),
                serial_number: format!("SN-{:06}", 100_000 + i),
                category: Some(category.id),
                assigned_to,
                purchase_date,
                status: Some(if assigned_to.is_some() {
                    AssetStatus::InUse
                } else {
                    AssetStatus::InStorage
                }),
                description: Some(format!("Seeded {}", category.name.to_lowercase())),
                notes: assigned_to.map(|_| "Initial allocation".to_string()),
            })
            .await
        {
            Ok(_) => assets_created += 1,
            Err(ServiceError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    println!("Assets: {}", assets_created);

    Ok(())
}
