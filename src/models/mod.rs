pub mod company;
pub mod role;
pub mod user;

pub use company::{Company, CompanyChanges, NewCompany};
pub use role::Role;
pub use user::{CreatedUser, NewUser, User, UserChanges, UserView};
