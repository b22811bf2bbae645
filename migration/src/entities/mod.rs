pub mod link;
pub mod link_list;
pub mod link_list_link;
pub mod link_tag;
pub mod setting;
pub mod tag;
pub mod user;

pub use link::Entity as LinkEntity;
pub use link_list::Entity as LinkListEntity;
pub use link_list_link::Entity as LinkListLinkEntity;
pub use link_tag::Entity as LinkTagEntity;
pub use setting::Entity as SettingEntity;
pub use tag::Entity as TagEntity;
pub use user::Entity as UserEntity;
