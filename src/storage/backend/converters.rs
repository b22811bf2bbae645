//! 实体模型与领域结构之间的转换

use migration::entities::{link, link_list, tag, user};

use crate::storage::models::{Link, LinkList, LinkStatus, Tag, User};

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        user_id: model.user_id,
        url: model.url,
        title: model.title,
        description: model.description,
        icon: model.icon,
        is_private: model.is_private,
        status: LinkStatus::from_i16(model.status),
        check_disabled: model.check_disabled,
        last_checked_at: model.last_checked_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

pub fn model_to_tag(model: tag::Model) -> Tag {
    Tag {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        is_private: model.is_private,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

pub fn model_to_list(model: link_list::Model) -> LinkList {
    LinkList {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        description: model.description,
        is_private: model.is_private,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password,
        api_token: model.api_token,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
