pub mod construction_site;
pub mod department;
pub mod execution_project;
pub mod person;
pub mod ppe_issue;
pub mod site_category;

pub use construction_site::Entity as ConstructionSites;
pub use construction_site::Manager as ConstructionSiteMgr;
pub use construction_site::Model as ConstructionSite;
pub use department::Entity as Departments;
pub use department::Manager as DepartmentMgr;
pub use department::Model as Department;
pub use execution_project::Entity as ExecutionProjects;
pub use execution_project::Manager as ExecutionProjectMgr;
pub use execution_project::Model as ExecutionProject;
pub use person::Entity as Persons;
pub use person::Manager as PersonMgr;
pub use person::Model as Person;
pub use ppe_issue::Entity as PpeIssues;
pub use ppe_issue::Manager as PpeIssueMgr;
pub use ppe_issue::Model as PpeIssue;
pub use site_category::Entity as SiteCategories;
pub use site_category::Manager as SiteCategoryMgr;
pub use site_category::Model as SiteCategory;
