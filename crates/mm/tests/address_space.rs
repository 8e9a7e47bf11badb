//! 帧分配器与地址空间的端到端测试

use mm::{
    AddressSpace, FrameAllocator, FrameArena, MemoryLayout, MmError, PAGE_SIZE, Paddr,
    PhysMemory, PteFlags, Vaddr,
};

const BASE: usize = 0x8000_0000;

/// 64 帧：内核 1 帧，位图 8 字节占 1 帧
fn small_machine() -> (FrameAllocator, FrameArena) {
    let layout = MemoryLayout::new(BASE, 64 * PAGE_SIZE, PAGE_SIZE);
    let mut frames = FrameAllocator::new(layout).unwrap();
    frames.init();
    (frames, FrameArena::new())
}

#[test]
fn test_exhaust_and_recycle() {
    let (mut frames, _) = small_machine();
    assert_eq!(frames.reserved_frames(), 2);

    let mut got = Vec::new();
    for _ in 0..62 {
        got.push(frames.allocate().unwrap());
    }
    assert_eq!(got[0], Paddr(BASE + 2 * PAGE_SIZE));
    assert!(got.windows(2).all(|w| w[1].0 == w[0].0 + PAGE_SIZE));
    assert_eq!(frames.allocate(), Err(MmError::OutOfMemory));

    frames.free(got[17]).unwrap();
    assert_eq!(frames.allocate(), Ok(got[17]));
}

#[test]
fn test_reserved_frames_rejected() {
    let (mut frames, _) = small_machine();
    assert_eq!(frames.free(Paddr(BASE)), Err(MmError::InvalidFree(BASE)));
    assert_eq!(
        frames.free(Paddr(BASE + 64 * PAGE_SIZE)),
        Err(MmError::InvalidFree(BASE + 64 * PAGE_SIZE))
    );
    assert_eq!(
        frames.free(Paddr(BASE + 0x2010)),
        Err(MmError::MisalignedFree(BASE + 0x2010))
    );
    assert!(frames.free(Paddr(0)).is_ok());
}

#[test]
fn test_fresh_space_intermediate_cost() {
    let (mut frames, mut mem) = small_machine();
    let space = AddressSpace::create(&mut frames, &mut mem).unwrap();
    let after_root = frames.allocated_frames();

    // 新地址空间的第一次映射需要中间级与叶子级各一页
    space
        .map(&mut frames, &mut mem, Vaddr(0x1000), Paddr(BASE + 0x10_000), PteFlags::R | PteFlags::X)
        .unwrap();
    assert_eq!(frames.allocated_frames(), after_root + 2);

    // 同一叶子页表内：不再分配
    space
        .map(&mut frames, &mut mem, Vaddr(0x2000), Paddr(BASE + 0x11_000), PteFlags::R)
        .unwrap();
    assert_eq!(frames.allocated_frames(), after_root + 2);

    // 共享根级与中间级、叶子索引不同：只多一页叶子页表
    space
        .map(&mut frames, &mut mem, Vaddr(1 << 21), Paddr(BASE + 0x12_000), PteFlags::R)
        .unwrap();
    assert_eq!(frames.allocated_frames(), after_root + 3);
}

#[test]
fn test_translate_round_trip() {
    let (mut frames, mut mem) = small_machine();
    let space = AddressSpace::create(&mut frames, &mut mem).unwrap();
    let code = frames.allocate().unwrap();
    let device = Paddr(0x1000_0000);

    space
        .map(&mut frames, &mut mem, Vaddr(0x1000), code, PteFlags::R | PteFlags::X)
        .unwrap();
    space
        .map(&mut frames, &mut mem, Vaddr(0x1000_0000), device, PteFlags::R | PteFlags::W)
        .unwrap();

    assert_eq!(space.translate(&mem, Vaddr(0x1234)), Some(code + 0x234));
    assert_eq!(space.translate(&mem, Vaddr(0x1000_0005)), Some(device + 5));
    assert_eq!(space.translate(&mem, Vaddr(0x5000)), None);

    let leaf = space.walk(&mem, Vaddr(0x1000_0000)).unwrap();
    assert!(leaf.is_leaf());
    assert!(!leaf.flags().contains(PteFlags::X));
    // 两个映射的 vpn2 都是 0，根页表只有一个有效入口
    assert_eq!(mem.table(space.root()).valid_count(), 1);
}

#[test]
fn test_exhaustion_during_map() {
    let (mut frames, mut mem) = small_machine();
    let space = AddressSpace::create(&mut frames, &mut mem).unwrap();
    while frames.allocate().is_ok() {}
    assert_eq!(
        space.map(&mut frames, &mut mem, Vaddr(0x1000), Paddr(BASE), PteFlags::R),
        Err(MmError::OutOfMemory)
    );
    assert_eq!(space.walk(&mem, Vaddr(0x1000)), None);
}

#[test]
fn test_second_mapping_costs_only_its_data_frame() {
    let (mut frames, mut mem) = small_machine();
    let space = AddressSpace::create(&mut frames, &mut mem).unwrap();

    let first = frames.allocate().unwrap();
    space
        .map(&mut frames, &mut mem, Vaddr(0x40_0000), first, PteFlags::R | PteFlags::W)
        .unwrap();

    // 与第一个映射共享根级与中间级索引，只有叶子索引不同
    let before = frames.allocated_frames();
    let second = frames.allocate().unwrap();
    space
        .map(&mut frames, &mut mem, Vaddr(0x40_1000), second, PteFlags::R | PteFlags::W)
        .unwrap();
    assert_eq!(frames.allocated_frames(), before + 1);
    assert_eq!(space.translate(&mem, Vaddr(0x40_1000)), Some(second));
}
