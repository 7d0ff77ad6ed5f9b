//! Transfer round bookkeeping: doctors, ranked preferences, couple applications, the
//! vacancy catalog and reports, all layered over the allocation pass.

pub mod catalog;
pub mod memory;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{filter_options, search_vacancies};
pub use memory::InMemoryTransferRepository;
pub use report::{couple_views, TransferReport};
pub use repository::{NewDoctor, RepositoryError, TransferRepository};
pub use router::{import_status_for, status_for, transfer_router};
pub use service::{TransferService, TransferServiceError, DOCTOR_PAGE_SIZE};
pub use views::{
    AdminLoginRequest, AssignmentView, AuthSession, CoupleInfo, CoupleMember, CoupleRequest,
    CoupleView, DoctorListing, DoctorReportEntry, FilterOptions, PositionStatus, PositionView,
    PreferenceItem, SessionRole, SummaryReport, VacancyFilter, VacancyListing,
    VacancyReportEntry,
};
